//! 脚本遍历器模块
//!
//! 遍历脚本语法树，只从能确定是数据而不是控制结构的位置提取字面量。
//!
//! 每个字符串或模板字面量先按父节点确定所在位置（`LiteralSite`），再映射为
//! 分类上下文：导入路径、键名、结构性调用参数、选择器槽位、类型、比较操作数和
//! 指令永远不透明；白名单属性赋值、setAttribute 的白名单值、文案键的值、
//! 选择器配对数组的第二项以及 JSX 文本和白名单属性按界面文案分类；
//! 其余字符串按普通脚本字符串分类。

use std::ops::Range;

use tree_sitter::Node;

use super::literal::LiteralKind;
use super::syntax::ScriptTree;
use crate::translation::config::constants;
use crate::translation::pipeline::{filters::is_selector_like, TextClassifier, TextCollector, TextContext};

/// 各提取位置的开关，全部开启时是最宽的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSites {
    /// 没有更具体位置信息的字符串
    pub string_literals: bool,
    /// 不含插值的模板字面量
    pub templates: bool,
    /// JSX 文本以及 JSX 子表达式中的字符串
    pub jsx_text: bool,
    /// JSX 白名单属性
    pub jsx_attributes: bool,
    /// `el.textContent = "..."` 形式的赋值
    pub text_assignments: bool,
    /// `el.setAttribute("title", "...")` 的第二个参数
    pub set_attribute: bool,
    /// 文案键的对象属性值
    pub prose_keys: bool,
    /// `[selector, label]` 配对数组的第二项
    pub paired_labels: bool,
}

impl Default for ScriptSites {
    fn default() -> Self {
        Self {
            string_literals: true,
            templates: true,
            jsx_text: true,
            jsx_attributes: true,
            text_assignments: true,
            set_attribute: true,
            prose_keys: true,
            paired_labels: true,
        }
    }
}

/// 脚本遍历器配置
#[derive(Debug, Clone)]
pub struct ScriptWalkerConfig {
    pub sites: ScriptSites,
    pub structural_methods: Vec<String>,
    pub text_properties: Vec<String>,
    pub prose_keys: Vec<String>,
    pub jsx_text_attrs: Vec<String>,
    /// setAttribute 可提取值的属性名
    pub set_attribute_names: Vec<String>,
    /// 子树内不提取的 JSX 元素
    pub skip_elements: Vec<String>,
}

impl Default for ScriptWalkerConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            sites: ScriptSites::default(),
            structural_methods: owned(constants::STRUCTURAL_METHODS),
            text_properties: owned(constants::TEXT_PROPERTIES),
            prose_keys: owned(constants::PROSE_KEYS),
            jsx_text_attrs: owned(constants::JSX_TEXT_ATTRS),
            set_attribute_names: owned(constants::TRANSLATABLE_ATTRS),
            skip_elements: owned(constants::SKIP_ELEMENTS),
        }
    }
}

/// 指向源码中一个字面量的补丁句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSlot {
    pub start: usize,
    pub end: usize,
    pub kind: LiteralKind,
}

impl LiteralSlot {
    /// 新值编码后的源码
    pub fn render(&self, value: &str) -> String {
        self.kind.encode(value)
    }
}

/// 字面量在语法树中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralSite {
    ImportSource,
    ModuleLoad,
    PropertyKey,
    StructuralArgument,
    SelectorSlot,
    TypeAnnotation,
    Comparison,
    Directive,
    TaggedTemplate,
    SetAttributeValue,
    ProseValue,
    TextAssignment,
    PairedLabel,
    JsxAttribute { allowed: bool },
    JsxChild,
    Generic,
}

/// 脚本遍历器
pub struct ScriptWalker<'a> {
    config: &'a ScriptWalkerConfig,
    classifier: &'a TextClassifier,
}

impl<'a> ScriptWalker<'a> {
    pub fn new(config: &'a ScriptWalkerConfig, classifier: &'a TextClassifier) -> Self {
        Self { config, classifier }
    }

    /// 遍历整棵语法树
    pub fn walk(&self, tree: &ScriptTree, collector: &mut TextCollector<LiteralSlot>) {
        self.visit(tree, tree.root(), collector);
    }

    fn visit(&self, tree: &ScriptTree, node: Node<'_>, collector: &mut TextCollector<LiteralSlot>) {
        match node.kind() {
            "string" => self.visit_string(tree, node, collector),
            "template_string" => {
                if has_child_kind(node, "template_substitution") {
                    // 插值模板本身不提取，只进入插值表达式
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        if child.kind() == "template_substitution" {
                            self.visit(tree, child, collector);
                        }
                    }
                } else {
                    self.visit_template(tree, node, collector);
                }
            }
            "jsx_text" | "html_character_reference" => {
                self.visit_jsx_text(tree, node.byte_range(), collector)
            }
            "jsx_element" if self.is_hidden_jsx_element(tree, node) => {}
            "comment" | "regex" => {}
            _ => self.visit_children(tree, node, collector),
        }
    }

    /// 遍历子节点，相邻的 JSX 文本与字符引用合并为一段文本
    fn visit_children(&self, tree: &ScriptTree, node: Node<'_>, collector: &mut TextCollector<LiteralSlot>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

        let mut index = 0;
        while index < children.len() {
            if !is_jsx_text_part(children[index]) {
                self.visit(tree, children[index], collector);
                index += 1;
                continue;
            }

            let start = children[index].start_byte();
            let mut end = children[index].end_byte();
            index += 1;
            while index < children.len() && is_jsx_text_part(children[index]) {
                end = children[index].end_byte();
                index += 1;
            }

            self.visit_jsx_text(tree, start..end, collector);
        }
    }

    fn visit_string(&self, tree: &ScriptTree, node: Node<'_>, collector: &mut TextCollector<LiteralSlot>) {
        let Some(source) = tree.text_of(node) else {
            return;
        };
        let Some(quote) = source.chars().next() else {
            return;
        };

        let in_jsx_attribute = node.parent().is_some_and(|p| p.kind() == "jsx_attribute");
        let kind = if in_jsx_attribute {
            LiteralKind::JsxAttribute { quote }
        } else {
            LiteralKind::String { quote }
        };

        let site = self.literal_site(tree, node);
        self.extract(node, kind, source, site, false, collector);
    }

    fn visit_template(&self, tree: &ScriptTree, node: Node<'_>, collector: &mut TextCollector<LiteralSlot>) {
        let Some(source) = tree.text_of(node) else {
            return;
        };

        let site = self.literal_site(tree, node);
        self.extract(node, LiteralKind::Template, source, site, true, collector);
    }

    fn visit_jsx_text(&self, tree: &ScriptTree, range: Range<usize>, collector: &mut TextCollector<LiteralSlot>) {
        if !self.config.sites.jsx_text {
            return;
        }
        let Some(source) = tree.source().get(range.clone()) else {
            return;
        };
        let Some(value) = LiteralKind::JsxText.decode(source) else {
            return;
        };

        self.push_classified(range, LiteralKind::JsxText, &value, TextContext::ScriptProse, collector);
    }

    fn extract(
        &self,
        node: Node<'_>,
        kind: LiteralKind,
        source: &str,
        site: LiteralSite,
        is_template: bool,
        collector: &mut TextCollector<LiteralSlot>,
    ) {
        if is_template && !self.config.sites.templates {
            return;
        }

        let Some(context) = self.site_context(site) else {
            return;
        };

        match kind.decode(source) {
            Some(value) => self.push_classified(node.byte_range(), kind, &value, context, collector),
            // 无法安全解码的字面量视为不透明
            None => collector.skip(),
        }
    }

    fn push_classified(
        &self,
        range: Range<usize>,
        kind: LiteralKind,
        value: &str,
        context: TextContext,
        collector: &mut TextCollector<LiteralSlot>,
    ) {
        if self.classifier.is_translatable(value, context) {
            collector.push(
                LiteralSlot {
                    start: range.start,
                    end: range.end,
                    kind,
                },
                value,
            );
        } else {
            collector.skip();
        }
    }

    /// 位置到分类上下文的映射，None 表示该位置不是提取点
    fn site_context(&self, site: LiteralSite) -> Option<TextContext> {
        let sites = &self.config.sites;
        let prose_or_generic = |enabled: bool| {
            if enabled {
                Some(TextContext::ScriptProse)
            } else if sites.string_literals {
                Some(TextContext::ScriptLiteral)
            } else {
                None
            }
        };

        match site {
            LiteralSite::ImportSource => Some(TextContext::ImportSource),
            LiteralSite::ModuleLoad => Some(TextContext::ModuleLoad),
            LiteralSite::PropertyKey => Some(TextContext::PropertyKey),
            LiteralSite::StructuralArgument => Some(TextContext::StructuralArgument),
            LiteralSite::SelectorSlot => Some(TextContext::SelectorSlot),
            LiteralSite::TypeAnnotation => Some(TextContext::TypeAnnotation),
            LiteralSite::Comparison => Some(TextContext::Comparison),
            LiteralSite::Directive => Some(TextContext::Directive),
            LiteralSite::TaggedTemplate => None,
            LiteralSite::JsxAttribute { allowed: false } => None,
            LiteralSite::JsxAttribute { allowed: true } => {
                sites.jsx_attributes.then_some(TextContext::ScriptProse)
            }
            LiteralSite::SetAttributeValue => prose_or_generic(sites.set_attribute),
            LiteralSite::ProseValue => prose_or_generic(sites.prose_keys),
            LiteralSite::TextAssignment => prose_or_generic(sites.text_assignments),
            LiteralSite::PairedLabel => prose_or_generic(sites.paired_labels),
            LiteralSite::JsxChild => prose_or_generic(sites.jsx_text),
            LiteralSite::Generic => sites.string_literals.then_some(TextContext::ScriptLiteral),
        }
    }

    /// 根据父节点确定字面量所在位置
    pub fn literal_site(&self, tree: &ScriptTree, node: Node<'_>) -> LiteralSite {
        let Some(parent) = node.parent() else {
            return LiteralSite::Generic;
        };

        if parent.child_by_field_name("key") == Some(node)
            || parent.child_by_field_name("name") == Some(node)
        {
            return LiteralSite::PropertyKey;
        }

        match parent.kind() {
            "import_statement" => LiteralSite::ImportSource,
            "export_statement" => {
                if parent.child_by_field_name("source") == Some(node) {
                    LiteralSite::ImportSource
                } else {
                    LiteralSite::Generic
                }
            }
            "import_require_clause" => LiteralSite::ModuleLoad,
            "arguments" => self.argument_site(tree, parent, node),
            "call_expression" => LiteralSite::TaggedTemplate,
            "subscript_expression" => {
                if parent.child_by_field_name("index") == Some(node) {
                    LiteralSite::PropertyKey
                } else {
                    LiteralSite::Generic
                }
            }
            "pair" => {
                let key = parent.child_by_field_name("key");
                match key.and_then(|k| self.static_key_name(tree, k)) {
                    Some(name) if self.contains(&self.config.prose_keys, &name) => LiteralSite::ProseValue,
                    _ => LiteralSite::Generic,
                }
            }
            "assignment_expression" => {
                let left = parent.child_by_field_name("left");
                match left.and_then(|l| member_property(tree, l)) {
                    Some(property) if self.contains(&self.config.text_properties, property) => {
                        LiteralSite::TextAssignment
                    }
                    _ => LiteralSite::Generic,
                }
            }
            "array" => self.array_site(tree, parent, node),
            "literal_type" => LiteralSite::TypeAnnotation,
            "binary_expression" => {
                let operator = parent.child_by_field_name("operator").map(|op| op.kind());
                match operator {
                    Some("==") | Some("===") | Some("!=") | Some("!==") => LiteralSite::Comparison,
                    _ => LiteralSite::Generic,
                }
            }
            "switch_case" => LiteralSite::Comparison,
            "expression_statement" => LiteralSite::Directive,
            "enum_assignment" | "enum_body" => LiteralSite::PropertyKey,
            "jsx_attribute" => LiteralSite::JsxAttribute {
                allowed: self.jsx_attribute_allowed(tree, parent),
            },
            "jsx_expression" => match parent.parent() {
                Some(owner) if owner.kind() == "jsx_attribute" => LiteralSite::JsxAttribute {
                    allowed: self.jsx_attribute_allowed(tree, owner),
                },
                Some(owner) if owner.kind() == "jsx_element" => LiteralSite::JsxChild,
                _ => LiteralSite::Generic,
            },
            _ => LiteralSite::Generic,
        }
    }

    fn argument_site(&self, tree: &ScriptTree, arguments: Node<'_>, node: Node<'_>) -> LiteralSite {
        let Some(call) = arguments.parent() else {
            return LiteralSite::Generic;
        };

        let callee = call
            .child_by_field_name("function")
            .or_else(|| call.child_by_field_name("constructor"));

        let callee_name = callee.and_then(|c| match c.kind() {
            "import" => Some("import"),
            "identifier" => tree.text_of(c),
            "member_expression" => member_property(tree, c),
            _ => None,
        });

        let Some(callee_name) = callee_name else {
            return LiteralSite::Generic;
        };

        if callee_name == "import" || (callee_name == "require" && callee.is_some_and(|c| c.kind() == "identifier")) {
            return LiteralSite::ModuleLoad;
        }

        let args = argument_nodes(arguments);
        let index = args.iter().position(|arg| *arg == node);

        if callee_name == "setAttribute" {
            return match index {
                Some(1) => {
                    let attribute = args
                        .first()
                        .and_then(|first| decode_plain_string(tree, *first));
                    match attribute {
                        Some(name) if self.contains(&self.config.set_attribute_names, &name) => {
                            LiteralSite::SetAttributeValue
                        }
                        _ => LiteralSite::StructuralArgument,
                    }
                }
                _ => LiteralSite::StructuralArgument,
            };
        }

        if index == Some(0) && self.contains(&self.config.structural_methods, callee_name) {
            return LiteralSite::StructuralArgument;
        }

        LiteralSite::Generic
    }

    fn array_site(&self, tree: &ScriptTree, array: Node<'_>, node: Node<'_>) -> LiteralSite {
        let elements = argument_nodes(array);
        if elements.len() != 2 {
            return LiteralSite::Generic;
        }

        let first_is_selector = decode_plain_string(tree, elements[0])
            .is_some_and(|value| value.trim().is_empty() || is_selector_like(&value));

        if !first_is_selector {
            LiteralSite::Generic
        } else if elements[0] == node {
            LiteralSite::SelectorSlot
        } else {
            LiteralSite::PairedLabel
        }
    }

    fn jsx_attribute_allowed(&self, tree: &ScriptTree, attribute: Node<'_>) -> bool {
        attribute
            .named_child(0)
            .and_then(|name| tree.text_of(name))
            .is_some_and(|name| self.contains(&self.config.jsx_text_attrs, name))
    }

    fn is_hidden_jsx_element(&self, tree: &ScriptTree, element: Node<'_>) -> bool {
        let opening = element
            .child_by_field_name("open_tag")
            .or_else(|| element.named_child(0));

        opening
            .and_then(|tag| tag.child_by_field_name("name"))
            .and_then(|name| tree.text_of(name))
            .is_some_and(|name| self.contains(&self.config.skip_elements, name))
    }

    fn static_key_name(&self, tree: &ScriptTree, key: Node<'_>) -> Option<String> {
        match key.kind() {
            "property_identifier" => tree.text_of(key).map(str::to_string),
            "string" => decode_plain_string(tree, key),
            _ => None,
        }
    }

    fn contains(&self, list: &[String], name: &str) -> bool {
        list.iter().any(|item| item == name)
    }
}

fn is_jsx_text_part(node: Node<'_>) -> bool {
    matches!(node.kind(), "jsx_text" | "html_character_reference")
        && node.parent().is_some_and(|p| p.kind() == "jsx_element")
}

fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// 去掉注释后的具名子节点
fn argument_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let nodes = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    nodes
}

/// 成员访问的属性名
fn member_property<'t>(tree: &'t ScriptTree, node: Node<'_>) -> Option<&'t str> {
    if node.kind() != "member_expression" {
        return None;
    }
    node.child_by_field_name("property")
        .and_then(|property| tree.text_of(property))
}

/// 解码普通字符串或无插值模板的值
fn decode_plain_string(tree: &ScriptTree, node: Node<'_>) -> Option<String> {
    let source = tree.text_of(node)?;
    match node.kind() {
        "string" => {
            let quote = source.chars().next()?;
            LiteralKind::String { quote }.decode(source)
        }
        "template_string" if !has_child_kind(node, "template_substitution") => {
            LiteralKind::Template.decode(source)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::splice::{splice_edits, SpliceEdit};
    use crate::parsers::js::syntax::{parse_script, ScriptDialect};
    use crate::translation::pipeline::reinsert;

    fn collect_with(source: &str, path: &str, config: &ScriptWalkerConfig) -> Vec<String> {
        let classifier = TextClassifier::default();
        let tree = parse_script(source, ScriptDialect::from_path(Some(path))).unwrap();

        let mut collector = TextCollector::default();
        ScriptWalker::new(config, &classifier).walk(&tree, &mut collector);
        collector.batch().texts().to_vec()
    }

    fn collect(source: &str) -> Vec<String> {
        collect_with(source, "app.js", &ScriptWalkerConfig::default())
    }

    #[test]
    fn test_set_attribute_allow_list() {
        let texts = collect(
            "obj.setAttribute(\"alt\", \"Logo image\");\nobj.setAttribute(\"href\", \"/x\");\n",
        );
        assert_eq!(texts, vec!["Logo image"]);
    }

    #[test]
    fn test_selector_label_pairs() {
        let texts = collect(
            "const pairs = [[\"#save-btn\", \"Save\"], [\"#save-btn\", \"not-a-button-id\"]];\n",
        );
        assert_eq!(texts, vec!["Save"]);
    }

    #[test]
    fn test_structural_positions_are_opaque() {
        let texts = collect(
            "\"use strict\";\n\
             import { x } from \"./module.js\";\n\
             const lib = require(\"lodash helpers\");\n\
             document.querySelector(\".btn-primary\").addEventListener(\"click\", handler);\n\
             localStorage.setItem(\"theme\", \"dark\");\n\
             const config = { title: \"Welcome back\", \"data-key\": \"value\", mode: \"light\" };\n\
             if (mode === \"Dark mode\") { run(); }\n\
             const lookup = table[\"Some key here\"];\n",
        );
        assert_eq!(texts, vec!["Welcome back"]);
    }

    #[test]
    fn test_text_assignment_allows_single_words() {
        let texts = collect("el.textContent = \"Save\";\nel.className = \"Save\";\nconst k = \"user_id\";\n");
        assert_eq!(texts, vec!["Save"], "Only the text-bearing property is prose");
    }

    #[test]
    fn test_generic_strings_need_prose_shape() {
        let texts = collect(
            "const msg = \"Something went wrong, please retry\";\nconst id = \"submitButton\";\n",
        );
        assert_eq!(texts, vec!["Something went wrong, please retry"]);
    }

    #[test]
    fn test_templates() {
        let texts = collect(
            "const a = `Plain template text`;\n\
             const b = `Hello ${name}, welcome`;\n\
             const c = `${count > 1 ? \"Many items here\" : \"One item here\"}`;\n\
             const d = html`Tagged text`;\n",
        );
        assert_eq!(texts, vec!["Plain template text", "Many items here", "One item here"]);
    }

    #[test]
    fn test_jsx_sites() {
        let source = r#"function App() {
  return (
    <div className="app-shell" title="Main panel">
      <h1>Welcome to the app</h1>
      <input placeholder={"Type here"} />
      <pre>Do not touch</pre>
      <p>{"Inline text"}</p>
    </div>
  );
}
"#;
        let texts = collect_with(source, "App.jsx", &ScriptWalkerConfig::default());
        assert_eq!(texts, vec!["Main panel", "Welcome to the app", "Type here", "Inline text"]);
    }

    #[test]
    fn test_jsx_text_with_character_references_is_one_string() {
        let source = "const a = <p>Tom &amp; Jerry are here</p>;\n";
        let texts = collect_with(source, "a.jsx", &ScriptWalkerConfig::default());
        assert_eq!(texts, vec!["Tom & Jerry are here"]);

        let config = ScriptWalkerConfig::default();
        let classifier = TextClassifier::default();
        let tree = parse_script(source, ScriptDialect::Tsx).unwrap();
        let mut collector = TextCollector::default();
        ScriptWalker::new(&config, &classifier).walk(&tree, &mut collector);
        let (_, items) = collector.finish();

        let mut edits = Vec::new();
        reinsert(&items, &["Tom & Jerry sont là".to_string()], |slot, value| {
            edits.push(SpliceEdit {
                start: slot.start,
                end: slot.end,
                replacement: slot.render(value),
            })
        });
        assert_eq!(
            splice_edits(source, edits).unwrap(),
            "const a = <p>Tom &amp; Jerry sont là</p>;\n"
        );
    }

    #[test]
    fn test_export_default_string_is_not_a_module_path() {
        let texts = collect(
            "export { helper } from \"./helpers are here.js\";\nexport default \"Hello there friend\";\n",
        );
        assert_eq!(texts, vec!["Hello there friend"]);
    }

    #[test]
    fn test_typescript_literal_types() {
        let texts = collect_with(
            "type Mode = \"Light theme\" | \"Dark theme\";\nconst label: string = \"Light theme shown\";\n",
            "types.ts",
            &ScriptWalkerConfig::default(),
        );
        assert_eq!(texts, vec!["Light theme shown"]);
    }

    #[test]
    fn test_disabled_site_falls_back_to_generic() {
        let mut config = ScriptWalkerConfig::default();
        config.sites.text_assignments = false;

        let texts = collect_with("el.textContent = \"Save\";\nel.title = \"Save your work\";\n", "a.js", &config);
        assert_eq!(texts, vec!["Save your work"], "Single word is key-like as a plain literal");

        config.sites.string_literals = false;
        let texts = collect_with("el.textContent = \"Save your work\";\n", "a.js", &config);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_write_back_keeps_quote_style() {
        let source = "el.textContent = 'Save';\nbutton.title = \"  Close window  \";\n";
        let config = ScriptWalkerConfig::default();
        let classifier = TextClassifier::default();
        let tree = parse_script(source, ScriptDialect::Tsx).unwrap();

        let mut collector = TextCollector::default();
        ScriptWalker::new(&config, &classifier).walk(&tree, &mut collector);
        let (batch, items) = collector.finish();
        assert_eq!(batch.texts(), &["Save".to_string(), "Close window".to_string()]);

        let translations = vec!["Enregistrer l'état".to_string(), "Fermer \"fenêtre\"".to_string()];
        let mut edits = Vec::new();
        reinsert(&items, &translations, |slot, value| {
            edits.push(SpliceEdit {
                start: slot.start,
                end: slot.end,
                replacement: slot.render(value),
            })
        });

        assert_eq!(
            splice_edits(source, edits).unwrap(),
            "el.textContent = 'Enregistrer l\\'état';\nbutton.title = \"  Fermer \\\"fenêtre\\\"  \";\n"
        );
    }
}
