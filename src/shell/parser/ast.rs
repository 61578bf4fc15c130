/// 一行输入解析后的结果，最多两个阶段，由一个管道连接。
///
/// 纯数据，不持有任何文件或进程资源；每轮循环新建，执行后丢弃。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandLine {
    pub primary_args: Vec<String>,
    pub secondary_args: Vec<String>,
    pub has_pipe: bool,
    pub background: bool,
    pub input_file: Option<String>,
    pub output_file: Option<String>,
    /// 仅在 `output_file` 存在时有意义
    pub append: bool,
}

impl CommandLine {
    pub fn program(&self) -> Option<&str> {
        self.primary_args.first().map(String::as_str)
    }
}
