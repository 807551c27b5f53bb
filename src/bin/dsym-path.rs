//! 输出最新构建中调试符号包的路径，无需任何参数

use std::process::ExitCode;

fn main() -> ExitCode {
    artloc::report(artloc::run_preset("dsym"))
}
