use clap::Parser;

use lsb_image::{
    cli::{Cli, Commands, normalize_mode},
    handler::{handle_decode, handle_encode},
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`encode` 或 `decode`）
/// 将执行分派到相应的处理函数，成功后打印处理报告
fn main() -> anyhow::Result<()> {
    env_logger::init();

    // 解析命令行参数，模式不区分大小写
    let cli = Cli::parse_from(normalize_mode(std::env::args_os()));

    match cli.command {
        Commands::Encode(args) => println!("{}", handle_encode(args)?),
        Commands::Decode(args) => println!("{}", handle_decode(args)?),
    }
    Ok(())
}
