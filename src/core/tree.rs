//! Generic expression tree built by the parser.
//!
//! The tree only records what the report generator needs: which values are
//! statically known, where key sites and translation sources are, and how
//! they nest. Anything the parser does not understand is an opaque leaf,
//! an empty plain [`Node::Expression`].

/// Statically known literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

/// Marks expressions with a role in tree transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    #[default]
    Plain,
    /// Content of a `<script>` element in a markup family.
    Script,
    /// Inlined body of a Vue `setup` function.
    Setup,
    /// `setup` bound to a reference instead of an inline function.
    SetupReference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expression {
        line: usize,
        block: Block,
        values: Vec<Node>,
    },
    Array {
        line: usize,
        values: Vec<Node>,
    },
    Dict(Dict),
    Primitive {
        line: usize,
        value: Value,
    },
    NamespaceInfo(NamespaceInfo),
    KeyInfo(KeyInfo),
}

/// Keyed properties in source order, plus values whose key is not static
/// (spreads, computed keys).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dict {
    pub line: usize,
    pub value: Vec<(String, Node)>,
    pub unknown: Vec<Node>,
}

/// Result of a translation-source call such as `useTranslate('ns')`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamespaceInfo {
    pub line: usize,
    pub name: Option<Box<Node>>,
    pub values: Vec<Node>,
}

/// A candidate extraction site.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyInfo {
    pub line: usize,
    /// The `t` function may be bound to a namespace by an enclosing source.
    pub depends_on_context: bool,
    pub key_name: Option<Box<Node>>,
    pub namespace: Option<Box<Node>>,
    pub default_value: Option<Box<Node>>,
    pub values: Vec<Node>,
    /// Options were passed but cannot be analyzed statically.
    pub options_dynamic: bool,
}

impl Node {
    /// Opaque leaf standing for tokens with no static meaning.
    pub fn opaque(line: usize) -> Self {
        Node::Expression {
            line,
            block: Block::Plain,
            values: Vec::new(),
        }
    }

    pub fn expression(line: usize, values: Vec<Node>) -> Self {
        Node::Expression {
            line,
            block: Block::Plain,
            values,
        }
    }

    pub fn string(line: usize, value: impl Into<String>) -> Self {
        Node::Primitive {
            line,
            value: Value::String(value.into()),
        }
    }

    /// Collapse a value list: a single value stands for itself.
    pub fn from_values(line: usize, mut values: Vec<Node>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            Node::expression(line, values)
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Node::Expression { line, .. }
            | Node::Array { line, .. }
            | Node::Primitive { line, .. } => *line,
            Node::Dict(dict) => dict.line,
            Node::NamespaceInfo(info) => info.line,
            Node::KeyInfo(info) => info.line,
        }
    }

    /// Statically known string value, looking through single-value expressions.
    pub fn as_static_str(&self) -> Option<&str> {
        match self {
            Node::Primitive {
                value: Value::String(s),
                ..
            } => Some(s),
            Node::Expression {
                block: Block::Plain,
                values,
                ..
            } if values.len() == 1 => values[0].as_static_str(),
            _ => None,
        }
    }

    /// Unwrap single-value plain expressions: `('a')` is `'a'`.
    pub fn into_single(self) -> Node {
        match self {
            Node::Expression {
                block: Block::Plain,
                mut values,
                ..
            } if values.len() == 1 => values.remove(0).into_single(),
            other => other,
        }
    }

    pub fn is_block(&self, kind: Block) -> bool {
        matches!(self, Node::Expression { block, .. } if *block == kind)
    }

    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            Node::Expression { block: Block::Plain, values, .. } if values.is_empty()
        )
    }

    /// Child values walked in document order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Expression { values, .. } | Node::Array { values, .. } => values.iter().collect(),
            Node::Dict(dict) => dict
                .value
                .iter()
                .map(|(_, node)| node)
                .chain(dict.unknown.iter())
                .collect(),
            Node::Primitive { .. } => Vec::new(),
            Node::NamespaceInfo(info) => info.name.iter().map(|n| &**n).chain(&info.values).collect(),
            Node::KeyInfo(info) => info.values.iter().collect(),
        }
    }
}

impl Dict {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.value.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert a property; a later duplicate key replaces the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.value.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.value.push((key, node)),
        }
    }

    /// Remove the first property matching any of `keys`.
    pub fn take(&mut self, keys: &[&str]) -> Option<Node> {
        let index = self.value.iter().position(|(k, _)| keys.contains(&k.as_str()))?;
        Some(self.value.remove(index).1)
    }

    /// Every remaining value, properties first.
    pub fn into_values(self) -> Vec<Node> {
        self.value
            .into_iter()
            .map(|(_, node)| node)
            .chain(self.unknown)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_str_through_single_expression() {
        let node = Node::expression(1, vec![Node::expression(1, vec![Node::string(1, "a")])]);
        assert_eq!(node.as_static_str(), Some("a"));
    }

    #[test]
    fn test_static_str_rejects_mixed_values() {
        let node = Node::expression(1, vec![Node::string(1, "a"), Node::opaque(1), Node::string(1, "b")]);
        assert_eq!(node.as_static_str(), None);
        let number = Node::Primitive {
            line: 1,
            value: Value::Number(1.0),
        };
        assert_eq!(number.as_static_str(), None);
    }

    #[test]
    fn test_script_block_is_never_static() {
        let node = Node::Expression {
            line: 1,
            block: Block::Script,
            values: vec![Node::string(1, "a")],
        };
        assert_eq!(node.as_static_str(), None);
    }

    #[test]
    fn test_into_single() {
        let dict = Node::Dict(Dict::new(2));
        let node = Node::expression(1, vec![Node::expression(1, vec![dict.clone()])]);
        assert_eq!(node.into_single(), dict);
        let pair = Node::expression(1, vec![Node::opaque(1), Node::opaque(1)]);
        assert_eq!(pair.clone().into_single(), pair);
    }

    #[test]
    fn test_dict_insert_and_take() {
        let mut dict = Dict::new(1);
        dict.insert("key", Node::string(1, "a"));
        dict.insert("ns", Node::string(1, "n"));
        dict.insert("key", Node::string(1, "b"));
        assert_eq!(dict.value.len(), 2);
        assert_eq!(dict.get("key").and_then(Node::as_static_str), Some("b"));
        assert!(dict.take(&["keyName", "key"]).is_some());
        assert!(dict.get("key").is_none());
    }
}
