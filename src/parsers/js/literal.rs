//! 脚本字面量的解码与重新编码
//!
//! 提取时把源码中的字面量解码为真实文本，回写时按原来的引号风格重新转义。

/// 字面量的语法形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// '...' 或 "..."
    String { quote: char },
    /// 不含插值的 `...`
    Template,
    /// JSX 元素之间的文本
    JsxText,
    /// JSX 属性中的 "..." 或 '...'，没有反斜杠转义
    JsxAttribute { quote: char },
}

impl LiteralKind {
    /// 从字面量源码解码出文本，无法安全解码时返回 None
    pub fn decode(&self, source: &str) -> Option<String> {
        match self {
            LiteralKind::String { quote } => {
                decode_js_escapes(strip_delimiters(source, *quote)?, false)
            }
            LiteralKind::Template => decode_js_escapes(strip_delimiters(source, '`')?, true),
            LiteralKind::JsxText => Some(decode_entities(source)),
            LiteralKind::JsxAttribute { quote } => {
                Some(decode_entities(strip_delimiters(source, *quote)?))
            }
        }
    }

    /// 把文本编码为可以直接替换原字面量的源码
    pub fn encode(&self, value: &str) -> String {
        match self {
            LiteralKind::String { quote } => {
                format!("{q}{}{q}", encode_string(value, *quote), q = quote)
            }
            LiteralKind::Template => format!("`{}`", encode_template(value)),
            LiteralKind::JsxText => encode_jsx_text(value),
            LiteralKind::JsxAttribute { quote } => {
                format!("{q}{}{q}", encode_jsx_attribute(value, *quote), q = quote)
            }
        }
    }
}

fn strip_delimiters(source: &str, quote: char) -> Option<&str> {
    source.strip_prefix(quote)?.strip_suffix(quote)
}

/// 解码 JavaScript 字符串转义
///
/// 支持 \n \t \r \b \f \v \0、\xHH、\uHHHH（含代理对）、\u{...}、行延续，
/// 其他 `\c` 解码为 `c`。孤立代理、八进制转义或格式错误时返回 None。
pub fn decode_js_escapes(raw: &str, template: bool) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' && template {
            // 模板中的 CRLF 与单独的 CR 都按 LF 处理
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
            continue;
        }

        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = chars.next()?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '0' => {
                if chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                    return None;
                }
                out.push('\0');
            }
            '1'..='9' => return None,
            'x' => {
                let code = read_hex(&mut chars, 2)?;
                out.push(char::from_u32(code)?);
            }
            'u' => {
                let code = read_unicode_escape(&mut chars)?;
                if (0xD800..0xDC00).contains(&code) {
                    // 高位代理必须紧跟低位代理
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return None;
                    }
                    let low = read_unicode_escape(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined)?);
                } else {
                    out.push(char::from_u32(code)?);
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    Some(out)
}

fn read_hex<I: Iterator<Item = char>>(chars: &mut I, digits: usize) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

fn read_unicode_escape<I: Iterator<Item = char>>(
    chars: &mut std::iter::Peekable<I>,
) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut code = 0u32;
        let mut digits = 0;
        loop {
            let c = chars.next()?;
            if c == '}' {
                break;
            }
            code = code.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            digits += 1;
        }
        if digits == 0 || code > 0x10FFFF {
            return None;
        }
        Some(code)
    } else {
        read_hex(chars, 4)
    }
}

fn encode_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn encode_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

fn encode_jsx_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

fn encode_jsx_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// 解码常见的 HTML 实体，无法识别的实体原样保留
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            decode_entity(&tail[1..end]).map(|c| (c, end))
        }) {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{A0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
