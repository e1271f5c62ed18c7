//! 标记源码的令牌与字节区间
//!
//! html5ever 分词器给出权威的令牌序列（包括字符引用解码后的文本和属性值），
//! 随后在源码中按顺序定位每个令牌，得到文本段、标签以及属性值的字节区间。
//! 写回时只替换这些区间，文档其余部分逐字节保留。
//!
//! 分词不经过树构建阶段，所以 `<tr>`、`<td>` 这类只在特定上下文中合法的片段
//! 也会原样保留。两边的令牌对不上时返回 None。

use std::cell::RefCell;
use std::ops::Range;
use std::sync::OnceLock;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use regex::Regex;

/// 标签内的一个属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    /// 小写属性名
    pub name: String,
    /// 解码后的值
    pub value: String,
    /// 值在源码中的区间，不含引号；没有值的属性为 None
    pub value_span: Option<Range<usize>>,
    pub quote: Option<char>,
}

/// 开始标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    /// 小写标签名
    pub name: String,
    pub span: Range<usize>,
    /// 标签名结束的位置，新属性插在这里
    pub name_end: usize,
    pub attrs: Vec<AttrSpan>,
    pub self_closing: bool,
}

impl TagSpan {
    pub fn attr(&self, name: &str) -> Option<&AttrSpan> {
        self.attrs.iter().find(|attr| attr.name.eq_ignore_ascii_case(name))
    }
}

/// 带源码区间的令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken {
    Text {
        span: Range<usize>,
        value: String,
        /// script/style 等原始文本元素的内容不解析字符引用，也不能转义写回
        escapable: bool,
    },
    StartTag(TagSpan),
    EndTag {
        name: String,
        span: Range<usize>,
    },
    Comment {
        span: Range<usize>,
    },
    Doctype {
        span: Range<usize>,
    },
}

/// 解析后的标记文档
#[derive(Debug, Clone)]
pub struct MarkupTree {
    source: String,
    tokens: Vec<MarkupToken>,
    document: bool,
}

impl MarkupTree {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[MarkupToken] {
        &self.tokens
    }

    /// 是否为完整文档（含 doctype 或 html/head/body 标签）
    pub fn is_document(&self) -> bool {
        self.document
    }

    /// 第一个指定名称的开始标签
    pub fn first_start_tag(&self, name: &str) -> Option<&TagSpan> {
        self.tokens.iter().find_map(|token| match token {
            MarkupToken::StartTag(tag) if tag.name == name => Some(tag),
            _ => None,
        })
    }
}

/// 输入是否为完整文档（含 doctype 或 html/head/body 标签）
pub fn is_full_document(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(!doctype|html|head|body)\b").unwrap())
        .is_match(text)
}

/// 解析标记文本
///
/// 令牌无法与源码对齐时返回 None，调用方应原样返回输入。
pub fn parse_markup(text: &str) -> Option<MarkupTree> {
    let raw_tokens = tokenize(text);
    let tokens = locate(text, raw_tokens)?;

    Some(MarkupTree {
        source: text.to_string(),
        tokens,
        document: is_full_document(text),
    })
}

// ============================================================================
// 分词
// ============================================================================

/// 分词器输出，文本已合并为连续的段
#[derive(Debug)]
enum RawToken {
    Text(String),
    Tag(Tag),
    Comment,
    Doctype,
}

/// 开始标签之后内容的读取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextMode {
    Raw(RawKind),
    Plaintext,
}

fn text_mode(tag_name: &str) -> Option<TextMode> {
    match tag_name {
        "title" | "textarea" => Some(TextMode::Raw(RawKind::Rcdata)),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            Some(TextMode::Raw(RawKind::Rawtext))
        }
        "script" => Some(TextMode::Raw(RawKind::ScriptData)),
        "plaintext" => Some(TextMode::Plaintext),
        _ => None,
    }
}

#[derive(Default)]
struct TokenRecorder {
    tokens: RefCell<Vec<RawToken>>,
}

impl TokenRecorder {
    fn push_text(&self, text: &str) {
        let mut tokens = self.tokens.borrow_mut();
        match tokens.last_mut() {
            Some(RawToken::Text(current)) => current.push_str(text),
            _ => tokens.push(RawToken::Text(text.to_string())),
        }
    }
}

impl TokenSink for TokenRecorder {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => self.push_text(&text),
            Token::NullCharacterToken => self.push_text("\0"),
            Token::TagToken(tag) => {
                let mode = match tag.kind {
                    TagKind::StartTag => text_mode(&tag.name),
                    TagKind::EndTag => None,
                };
                self.tokens.borrow_mut().push(RawToken::Tag(tag));

                return match mode {
                    Some(TextMode::Raw(kind)) => TokenSinkResult::RawData(kind),
                    Some(TextMode::Plaintext) => TokenSinkResult::Plaintext,
                    None => TokenSinkResult::Continue,
                };
            }
            Token::CommentToken(_) => self.tokens.borrow_mut().push(RawToken::Comment),
            Token::DoctypeToken(_) => self.tokens.borrow_mut().push(RawToken::Doctype),
            Token::EOFToken | Token::ParseError(_) => {}
        }

        TokenSinkResult::Continue
    }
}

fn tokenize(text: &str) -> Vec<RawToken> {
    let opts = TokenizerOpts {
        discard_bom: false,
        ..Default::default()
    };
    let tokenizer = Tokenizer::new(TokenRecorder::default(), opts);

    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from_slice(text));
    // 记录器从不返回 Script，分词一次即可完成
    while let TokenizerResult::Script(()) = tokenizer.feed(&queue) {}
    tokenizer.end();

    tokenizer.sink.tokens.take()
}

// ============================================================================
// 定位
// ============================================================================

/// 源码中一个标记结构的起点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkupStart {
    StartTag,
    EndTag,
    /// `<!`、`<?` 或 `</` 后跟非字母
    Declaration,
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// 从 `from` 开始查找下一个标记结构的起点
///
/// `</>` 不产生令牌，按文本跳过。
fn find_markup_start(bytes: &[u8], from: usize) -> Option<(usize, MarkupStart)> {
    let mut index = from;

    while index < bytes.len() {
        if bytes[index] != b'<' {
            index += 1;
            continue;
        }

        match bytes.get(index + 1) {
            Some(b) if b.is_ascii_alphabetic() => return Some((index, MarkupStart::StartTag)),
            Some(b'!') | Some(b'?') => return Some((index, MarkupStart::Declaration)),
            Some(b'/') => match bytes.get(index + 2) {
                Some(b) if b.is_ascii_alphabetic() => return Some((index, MarkupStart::EndTag)),
                Some(b'>') => index += 3,
                Some(_) => return Some((index, MarkupStart::Declaration)),
                None => index += 2,
            },
            _ => index += 1,
        }
    }

    None
}

/// 注释、doctype 与伪注释的结束位置
fn declaration_end(source: &str, start: usize) -> usize {
    let rest = &source[start..];

    if let Some(body) = rest.strip_prefix("<!--") {
        if body.starts_with('>') {
            return start + 5;
        }
        if body.starts_with("->") {
            return start + 6;
        }

        let close = [body.find("-->").map(|i| i + 3), body.find("--!>").map(|i| i + 4)]
            .into_iter()
            .flatten()
            .min();
        return match close {
            Some(end) => start + 4 + end,
            None => source.len(),
        };
    }

    match rest.find('>') {
        Some(i) => start + i + 1,
        None => source.len(),
    }
}

/// 词法扫描得到的属性
struct ScannedAttr {
    name: String,
    value_span: Option<Range<usize>>,
    quote: Option<char>,
}

struct ScannedTag {
    name: String,
    name_end: usize,
    end: usize,
    attrs: Vec<ScannedAttr>,
}

/// 扫描一个标签，未闭合时返回 None
fn scan_tag(source: &str, start: usize) -> Option<ScannedTag> {
    let bytes = source.as_bytes();
    let mut index = start + 1;
    if bytes.get(index) == Some(&b'/') {
        index += 1;
    }

    let name_start = index;
    while index < bytes.len() && !is_space(bytes[index]) && bytes[index] != b'/' && bytes[index] != b'>' {
        index += 1;
    }
    let name_end = index;
    let name = source[name_start..name_end].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while index < bytes.len() && is_space(bytes[index]) {
            index += 1;
        }

        match *bytes.get(index)? {
            b'>' => {
                return Some(ScannedTag {
                    name,
                    name_end,
                    end: index + 1,
                    attrs,
                })
            }
            b'/' => {
                index += 1;
                continue;
            }
            _ => {}
        }

        // 属性名的第一个字符可以是 `=`
        let attr_start = index;
        index += 1;
        while index < bytes.len()
            && !is_space(bytes[index])
            && !matches!(bytes[index], b'/' | b'>' | b'=')
        {
            index += 1;
        }
        let attr_name = source[attr_start..index].to_ascii_lowercase();

        let mut after_name = index;
        while after_name < bytes.len() && is_space(bytes[after_name]) {
            after_name += 1;
        }

        if bytes.get(after_name) != Some(&b'=') {
            attrs.push(ScannedAttr {
                name: attr_name,
                value_span: None,
                quote: None,
            });
            continue;
        }

        index = after_name + 1;
        while index < bytes.len() && is_space(bytes[index]) {
            index += 1;
        }

        match *bytes.get(index)? {
            quote @ (b'"' | b'\'') => {
                let value_start = index + 1;
                let close = source[value_start..].find(quote as char)?;
                let value_end = value_start + close;
                attrs.push(ScannedAttr {
                    name: attr_name,
                    value_span: Some(value_start..value_end),
                    quote: Some(quote as char),
                });
                index = value_end + 1;
            }
            b'>' => attrs.push(ScannedAttr {
                name: attr_name,
                value_span: None,
                quote: None,
            }),
            _ => {
                let value_start = index;
                while index < bytes.len() && !is_space(bytes[index]) && bytes[index] != b'>' {
                    index += 1;
                }
                attrs.push(ScannedAttr {
                    name: attr_name,
                    value_span: Some(value_start..index),
                    quote: None,
                });
            }
        }
    }
}

/// 原始文本元素的结束标签位置
fn raw_text_end(source: &str, from: usize, tag_name: &str) -> usize {
    let bytes = source.as_bytes();
    let needle = format!("</{}", tag_name);
    let mut index = from;

    while let Some(offset) = source[index..].find("</") {
        let candidate = index + offset;
        let name_end = candidate + needle.len();
        let matches_name = source
            .get(candidate..name_end)
            .is_some_and(|text| text.eq_ignore_ascii_case(&needle));
        let terminated = bytes
            .get(name_end)
            .is_some_and(|b| is_space(*b) || matches!(b, b'/' | b'>'));

        if matches_name && terminated {
            return candidate;
        }
        index = candidate + 2;
    }

    source.len()
}

/// 文本段的粗校验：不含字符引用、`</>` 和需要规范化的字符时，源码必须与解码结果一致
fn text_matches(raw: &str, value: &str) -> bool {
    raw.contains(['&', '\r', '\0']) || raw.contains("</>") || raw == value
}

/// 按分词结果在源码中逐个定位令牌
fn locate(source: &str, raw_tokens: Vec<RawToken>) -> Option<Vec<MarkupToken>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::with_capacity(raw_tokens.len());
    let mut cursor = 0;
    let mut pending_text: Option<String> = None;
    // 当前原始文本元素：(标签名, 内容能否转义写回)
    let mut raw_element: Option<(String, bool)> = None;
    let mut plaintext = false;

    for raw in raw_tokens {
        if let RawToken::Text(value) = raw {
            pending_text = Some(value);
            continue;
        }

        let (start, kind) = match &raw_element {
            Some((name, _)) => {
                let start = raw_text_end(source, cursor, name);
                (start, MarkupStart::EndTag)
            }
            None if plaintext => return None,
            None => find_markup_start(bytes, cursor)?,
        };

        let escapable = raw_element.as_ref().map_or(true, |(_, escapable)| *escapable);
        match pending_text.take() {
            Some(value) if start > cursor => {
                if escapable && !text_matches(&source[cursor..start], &value) {
                    return None;
                }
                tokens.push(MarkupToken::Text {
                    span: cursor..start,
                    value,
                    escapable,
                });
            }
            None if start == cursor => {}
            _ => return None,
        }

        let token = match raw {
            RawToken::Tag(tag) => {
                let expected = match tag.kind {
                    TagKind::StartTag => MarkupStart::StartTag,
                    TagKind::EndTag => MarkupStart::EndTag,
                };
                if kind != expected {
                    return None;
                }

                let scanned = scan_tag(source, start)?;
                if scanned.name != &*tag.name {
                    return None;
                }

                if tag.kind == TagKind::EndTag {
                    raw_element = None;
                    cursor = scanned.end;
                    tokens.push(MarkupToken::EndTag {
                        name: scanned.name,
                        span: start..scanned.end,
                    });
                    continue;
                }

                match text_mode(&tag.name) {
                    Some(TextMode::Raw(raw_kind)) => {
                        raw_element = Some((scanned.name.clone(), raw_kind == RawKind::Rcdata))
                    }
                    Some(TextMode::Plaintext) => plaintext = true,
                    None => {}
                }

                cursor = scanned.end;
                MarkupToken::StartTag(align_attributes(&tag, scanned, start))
            }
            RawToken::Comment | RawToken::Doctype if kind != MarkupStart::Declaration => return None,
            RawToken::Comment => {
                let end = declaration_end(source, start);
                cursor = end;
                MarkupToken::Comment { span: start..end }
            }
            RawToken::Doctype => {
                let end = declaration_end(source, start);
                cursor = end;
                MarkupToken::Doctype { span: start..end }
            }
            RawToken::Text(_) => return None,
        };

        tokens.push(token);
    }

    // 末尾文本
    let escapable = raw_element
        .as_ref()
        .map_or(!plaintext, |(_, escapable)| *escapable);
    match pending_text {
        Some(value) if cursor < source.len() => {
            if escapable && !text_matches(&source[cursor..], &value) {
                return None;
            }
            tokens.push(MarkupToken::Text {
                span: cursor..source.len(),
                value,
                escapable,
            });
        }
        None if cursor == source.len() => {}
        _ => return None,
    }

    Some(tokens)
}

/// 把分词器解码后的属性值与扫描到的源码区间对应起来
///
/// 分词器丢弃重复属性，只保留第一次出现的值。
fn align_attributes(tag: &Tag, scanned: ScannedTag, start: usize) -> TagSpan {
    let attrs = tag
        .attrs
        .iter()
        .map(|attr| {
            let name = attr.name.local.to_string();
            let located = scanned.attrs.iter().find(|candidate| candidate.name == name);
            AttrSpan {
                value: attr.value.to_string(),
                value_span: located.and_then(|candidate| candidate.value_span.clone()),
                quote: located.and_then(|candidate| candidate.quote),
                name,
            }
        })
        .collect();

    TagSpan {
        name: scanned.name,
        span: start..scanned.end,
        name_end: scanned.name_end,
        attrs,
        self_closing: tag.self_closing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice<'a>(tree: &'a MarkupTree, span: &Range<usize>) -> &'a str {
        &tree.source()[span.clone()]
    }

    #[test]
    fn test_document_detection() {
        assert!(is_full_document("<!DOCTYPE html><p>x</p>"));
        assert!(is_full_document("<HTML lang=\"en\">"));
        assert!(is_full_document("  <body>hi</body>"));
        assert!(!is_full_document("<button>Go</button>"));
        assert!(!is_full_document("<header>Top</header>"), "header is not head");
    }

    #[test]
    fn test_tokens_cover_source() {
        let source = "<!DOCTYPE html>\n<p class=x>Tom &amp; Jerry</p><!-- note --><br/>";
        let tree = parse_markup(source).unwrap();

        let kinds: Vec<&str> = tree
            .tokens()
            .iter()
            .map(|token| match token {
                MarkupToken::Text { .. } => "text",
                MarkupToken::StartTag(_) => "start",
                MarkupToken::EndTag { .. } => "end",
                MarkupToken::Comment { .. } => "comment",
                MarkupToken::Doctype { .. } => "doctype",
            })
            .collect();
        assert_eq!(kinds, vec!["doctype", "text", "start", "text", "end", "comment", "start"]);

        let MarkupToken::Text { span, value, .. } = &tree.tokens()[3] else {
            panic!("expected text");
        };
        assert_eq!(slice(&tree, span), "Tom &amp; Jerry");
        assert_eq!(value, "Tom & Jerry");
    }

    #[test]
    fn test_attribute_spans_by_quote_style() {
        let source = "<img src=x.png alt='A cat' title=\"Say &quot;hi&quot;\" hidden>";
        let tree = parse_markup(source).unwrap();
        let tag = tree.first_start_tag("img").unwrap();

        let src = tag.attr("src").unwrap();
        assert_eq!(src.quote, None);
        assert_eq!(slice(&tree, src.value_span.as_ref().unwrap()), "x.png");

        let alt = tag.attr("alt").unwrap();
        assert_eq!(alt.quote, Some('\''));
        assert_eq!(slice(&tree, alt.value_span.as_ref().unwrap()), "A cat");

        let title = tag.attr("title").unwrap();
        assert_eq!(title.value, "Say \"hi\"");
        assert_eq!(slice(&tree, title.value_span.as_ref().unwrap()), "Say &quot;hi&quot;");

        let hidden = tag.attr("hidden").unwrap();
        assert_eq!(hidden.value, "");
        assert_eq!(hidden.value_span, None);
        assert_eq!(tag.name_end, 4);
    }

    #[test]
    fn test_table_partials_keep_their_tags() {
        let tree = parse_markup("<tr><td>Name</td><td>Price</td></tr>").unwrap();
        let texts: Vec<&str> = tree
            .tokens()
            .iter()
            .filter_map(|token| match token {
                MarkupToken::Text { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Name", "Price"]);
        assert!(tree.first_start_tag("tr").is_some());
        assert!(!tree.is_document());
    }

    #[test]
    fn test_raw_text_elements() {
        let source = "<script>if (a < b) { x = '<p>'; }</script><title>Fish &amp; Chips</title>";
        let tree = parse_markup(source).unwrap();

        let texts: Vec<(&str, bool)> = tree
            .tokens()
            .iter()
            .filter_map(|token| match token {
                MarkupToken::Text { value, escapable, .. } => Some((value.as_str(), *escapable)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![("if (a < b) { x = '<p>'; }", false), ("Fish & Chips", true)]
        );
    }

    #[test]
    fn test_stray_angle_brackets_are_text() {
        let tree = parse_markup("<p>1 < 2 and </> 3</p>").unwrap();
        let MarkupToken::Text { span, value, .. } = &tree.tokens()[1] else {
            panic!("expected text");
        };
        assert_eq!(slice(&tree, span), "1 < 2 and </> 3");
        assert_eq!(value, "1 < 2 and  3");
    }

    #[test]
    fn test_unterminated_tag_is_rejected() {
        assert!(parse_markup("<p>Hello</p><img alt=\"Open").is_none());
    }
}
