//! 脚本语法树
//!
//! 使用 tree-sitter 解析脚本。`.ts/.mts/.cts` 使用 TypeScript 语法，其余脚本
//! 使用 TSX 语法（同时覆盖 JavaScript 与 JSX）。

use std::path::Path;
use std::sync::OnceLock;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::translation::error::{TranslationError, TranslationResult};

/// 脚本方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptDialect {
    Tsx,
    TypeScript,
}

impl ScriptDialect {
    /// 根据文件扩展名选择方言，未知时按 TSX 处理
    pub fn from_path(path: Option<&str>) -> Self {
        let extension = path
            .and_then(|p| Path::new(p).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("ts") | Some("mts") | Some("cts") => ScriptDialect::TypeScript,
            _ => ScriptDialect::Tsx,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptDialect::Tsx => "tsx",
            ScriptDialect::TypeScript => "typescript",
        }
    }

    fn language(&self) -> Language {
        match self {
            ScriptDialect::Tsx => tree_sitter_typescript::language_tsx(),
            ScriptDialect::TypeScript => tree_sitter_typescript::language_typescript(),
        }
    }
}

/// 解析结果：源码与语法树
pub struct ScriptTree {
    source: String,
    tree: Tree,
    dialect: ScriptDialect,
}

impl ScriptTree {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn dialect(&self) -> ScriptDialect {
        self.dialect
    }

    /// 节点对应的源码片段
    pub fn text_of(&self, node: Node<'_>) -> Option<&str> {
        self.source.get(node.byte_range())
    }
}

/// 方言的语法是否可用
///
/// 首次调用时检查一次，结果在进程生命周期内保持不变；不可用时只记录一次警告。
pub fn is_available(dialect: ScriptDialect) -> bool {
    static TSX: OnceLock<bool> = OnceLock::new();
    static TYPESCRIPT: OnceLock<bool> = OnceLock::new();

    let cell = match dialect {
        ScriptDialect::Tsx => &TSX,
        ScriptDialect::TypeScript => &TYPESCRIPT,
    };

    *cell.get_or_init(|| {
        let mut parser = Parser::new();
        match parser.set_language(&dialect.language()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "脚本语法 {} 不可用，此类文档将原样返回: {}",
                    dialect.name(),
                    e
                );
                false
            }
        }
    })
}

/// 解析脚本源码
///
/// 语法不可用时返回 `SerializerUnavailable`，源码包含语法错误时返回 `ParseError`。
pub fn parse_script(source: &str, dialect: ScriptDialect) -> TranslationResult<ScriptTree> {
    if !is_available(dialect) {
        return Err(TranslationError::SerializerUnavailable(format!(
            "脚本语法 {} 不可用",
            dialect.name()
        )));
    }

    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| TranslationError::SerializerUnavailable(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| TranslationError::ParseError("脚本解析被中断".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let position = first_error(root)
            .map(|node| {
                let point = node.start_position();
                format!("第 {} 行第 {} 列", point.row + 1, point.column + 1)
            })
            .unwrap_or_else(|| "未知位置".to_string());

        return Err(TranslationError::ParseError(format!(
            "脚本存在语法错误 ({})",
            position
        )));
    }

    Ok(ScriptTree {
        source: source.to_string(),
        tree,
        dialect,
    })
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_path() {
        assert_eq!(ScriptDialect::from_path(Some("src/app.ts")), ScriptDialect::TypeScript);
        assert_eq!(ScriptDialect::from_path(Some("lib/index.MTS")), ScriptDialect::TypeScript);
        assert_eq!(ScriptDialect::from_path(Some("App.tsx")), ScriptDialect::Tsx);
        assert_eq!(ScriptDialect::from_path(Some("main.js")), ScriptDialect::Tsx);
        assert_eq!(ScriptDialect::from_path(None), ScriptDialect::Tsx);
    }

    #[test]
    fn test_grammars_are_available() {
        assert!(is_available(ScriptDialect::Tsx));
        assert!(is_available(ScriptDialect::TypeScript));
    }

    #[test]
    fn test_parse_valid_script() {
        let tree = parse_script("const greeting = 'Hello';", ScriptDialect::Tsx).unwrap();
        assert_eq!(tree.root().kind(), "program");
        assert_eq!(tree.text_of(tree.root()), Some("const greeting = 'Hello';"));
    }

    #[test]
    fn test_parse_jsx_and_typescript() {
        assert!(parse_script("const el = <p title=\"Hi\">Hello</p>;", ScriptDialect::Tsx).is_ok());
        assert!(parse_script(
            "type Mode = \"light\" | \"dark\";\nlet m: Mode = \"light\";",
            ScriptDialect::TypeScript
        )
        .is_ok());
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let result = parse_script("const = ;\nfunction (", ScriptDialect::Tsx);
        assert!(matches!(result, Err(TranslationError::ParseError(_))));
    }
}
