//! 输出最新构建中 IPA 安装包的路径，无需任何参数

use std::process::ExitCode;

fn main() -> ExitCode {
    artloc::report(artloc::run_preset("ipa"))
}
