//! 材质名称表
//!
//! 材质表是一段以空格分隔、以 NUL 结尾的文本，名称可以被双引号包裹。
//! 名称在表中的顺序即材质索引。

use serde::{Deserialize, Serialize};

/// 材质表的分词方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// 引号内的空格不作为分隔符，`"Metal Plate"` 是一个名称
    #[default]
    Quoted,

    /// 每个空格都是分隔符，`"Metal Plate"` 会被拆成两个记号。
    /// 与旧版工具链的行为逐字节一致。
    Legacy,
}

/// 将材质表（不含结尾 NUL）拆分为原始记号，空记号被跳过
pub fn split_tokens(raw: &[u8], mode: SplitMode) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        if raw[pos] == b' ' {
            pos += 1;
            continue;
        }

        let end = match mode {
            SplitMode::Quoted if raw[pos] == b'"' => raw[pos + 1..]
                .iter()
                .position(|&b| b == b'"')
                .map(|close| pos + 1 + close + 1)
                .unwrap_or_else(|| next_space(raw, pos)),
            _ => next_space(raw, pos),
        };

        tokens.push(String::from_utf8_lossy(&raw[pos..end]).into_owned());
        pos = end;
    }

    tokens
}

fn next_space(raw: &[u8], from: usize) -> usize {
    raw[from..]
        .iter()
        .position(|&b| b == b' ')
        .map_or(raw.len(), |p| from + p)
}

/// 去掉记号两端的空白和引号
pub fn strip_quotes(token: &str) -> String {
    let name = token.trim();
    let name = name.strip_prefix('"').unwrap_or(name);
    let name = name.strip_suffix('"').unwrap_or(name);
    name.to_string()
}

/// 将名称列表编码为材质表文本（不含结尾 NUL）
///
/// 名称以单个空格分隔，包含空格的名称会被引号包裹。
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if name.contains(' ') {
                format!("\"{}\"", name)
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
