//! Assembles statements into a document tree while enforcing TOML's
//! definition rules.
//!
//! Tables under construction live in an arena and are addressed by index,
//! which lets a header or dotted key reach back into any table created
//! earlier without holding borrows across statements. Each node remembers
//! how it came to exist:
//!
//! - tables created implicitly (as a header prefix or by a dotted key) may
//!   still be declared once with their own `[header]`
//! - tables declared by a header may not be declared again
//! - arrays of tables grow with each `[[header]]`, and header paths passing
//!   through one resolve into its last element
//! - inline tables and arrays are sealed and can never be extended
//!
//! [`DocumentBuilder::build`] freezes the arena into a plain [`Table`].

use crate::parser::Statement;
use crate::{Error, Result, Table, Value};
use indexmap::IndexMap;
use tracing::trace;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum Node {
    Table {
        entries: IndexMap<String, NodeId>,
        /// Set once the table has been named by its own `[header]`.
        declared: bool,
    },
    TableArray(Vec<NodeId>),
    /// A scalar, or an inline array or inline table.
    Sealed(Value),
}

impl Node {
    fn table(declared: bool) -> Self {
        Node::Table {
            entries: IndexMap::new(),
            declared,
        }
    }

    fn is_inline_collection(&self) -> bool {
        matches!(self, Node::Sealed(Value::Table(_) | Value::Array(_)))
    }
}

pub(crate) struct DocumentBuilder {
    nodes: Vec<Node>,
    current: NodeId,
    /// Path of the table the last header selected; empty for the root.
    current_path: Vec<String>,
}

impl DocumentBuilder {
    pub(crate) fn new() -> Self {
        DocumentBuilder {
            nodes: vec![Node::table(true)],
            current: ROOT,
            current_path: Vec::new(),
        }
    }

    /// Applies one statement found on `line`.
    pub(crate) fn apply(&mut self, line: usize, statement: Statement) -> Result<()> {
        trace!(line, ?statement, "applying statement");
        match statement {
            Statement::KeyValue { keys, value } => self.key_value(line, &keys, value),
            Statement::Table(keys) => self.table_header(line, &keys),
            Statement::ArrayTable(keys) => self.array_header(line, &keys),
        }
    }

    /// Consumes the builder and returns the finished root table.
    pub(crate) fn build(self) -> Table {
        let mut nodes = self.nodes;
        match std::mem::replace(&mut nodes[ROOT], Node::TableArray(Vec::new())) {
            Node::Table { entries, .. } => freeze_table(&mut nodes, entries),
            _ => Table::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn lookup(&self, table: NodeId, key: &str) -> Option<NodeId> {
        match &self.nodes[table] {
            Node::Table { entries, .. } => entries.get(key).copied(),
            _ => None,
        }
    }

    fn attach(&mut self, table: NodeId, key: &str, child: NodeId) {
        if let Node::Table { entries, .. } = &mut self.nodes[table] {
            entries.insert(key.to_string(), child);
        }
    }

    /// Dotted display path for error messages.
    fn path_of(base: &[String], keys: &[String]) -> String {
        base.iter()
            .chain(keys)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    fn key_value(&mut self, line: usize, keys: &[String], value: Value) -> Result<()> {
        let Some((leaf, prefix)) = keys.split_last() else {
            return Err(Error::syntax(line, 1, "empty key"));
        };
        let mut table = self.current;
        for (i, key) in prefix.iter().enumerate() {
            table = match self.lookup(table, key) {
                None => {
                    let child = self.alloc(Node::table(false));
                    self.attach(table, key, child);
                    child
                }
                Some(id) => match &self.nodes[id] {
                    Node::Table { .. } => id,
                    node if node.is_inline_collection() => {
                        let path = Self::path_of(&self.current_path, &keys[..=i]);
                        return Err(Error::extending_inline(line, path));
                    }
                    _ => {
                        let path = Self::path_of(&self.current_path, &keys[..=i]);
                        return Err(Error::not_a_table(line, path));
                    }
                },
            };
        }
        if self.lookup(table, leaf).is_some() {
            let path = Self::path_of(&self.current_path, keys);
            return Err(Error::already_defined(line, path));
        }
        let id = self.alloc(Node::Sealed(value));
        self.attach(table, leaf, id);
        Ok(())
    }

    /// Walks the non-final segments of a header path from the root.
    fn header_parent(&mut self, line: usize, keys: &[String]) -> Result<NodeId> {
        let mut table = ROOT;
        for (i, key) in keys.iter().enumerate() {
            table = match self.lookup(table, key) {
                None => {
                    let child = self.alloc(Node::table(false));
                    self.attach(table, key, child);
                    child
                }
                Some(id) => match &self.nodes[id] {
                    Node::Table { .. } => id,
                    Node::TableArray(elements) => match elements.last() {
                        Some(&last) => last,
                        None => return Err(Error::not_a_table(line, keys[..=i].join("."))),
                    },
                    node if node.is_inline_collection() => {
                        return Err(Error::extending_inline(line, keys[..=i].join(".")))
                    }
                    _ => return Err(Error::not_a_table(line, keys[..=i].join("."))),
                },
            };
        }
        Ok(table)
    }

    fn table_header(&mut self, line: usize, keys: &[String]) -> Result<()> {
        let Some((leaf, prefix)) = keys.split_last() else {
            return Err(Error::syntax(line, 1, "empty table header"));
        };
        let parent = self.header_parent(line, prefix)?;
        let table = match self.lookup(parent, leaf) {
            None => {
                let id = self.alloc(Node::table(true));
                self.attach(parent, leaf, id);
                id
            }
            Some(id) => match &mut self.nodes[id] {
                Node::Table { declared, .. } if !*declared => {
                    *declared = true;
                    id
                }
                node if node.is_inline_collection() => {
                    return Err(Error::extending_inline(line, keys.join(".")))
                }
                _ => return Err(Error::already_defined(line, keys.join("."))),
            },
        };
        self.current = table;
        self.current_path = keys.to_vec();
        Ok(())
    }

    fn array_header(&mut self, line: usize, keys: &[String]) -> Result<()> {
        let Some((leaf, prefix)) = keys.split_last() else {
            return Err(Error::syntax(line, 1, "empty array-of-tables header"));
        };
        let parent = self.header_parent(line, prefix)?;
        let element = match self.lookup(parent, leaf) {
            None => {
                let element = self.alloc(Node::table(true));
                let array = self.alloc(Node::TableArray(vec![element]));
                self.attach(parent, leaf, array);
                element
            }
            Some(id) if matches!(self.nodes[id], Node::TableArray(_)) => {
                let element = self.alloc(Node::table(true));
                if let Node::TableArray(elements) = &mut self.nodes[id] {
                    elements.push(element);
                }
                element
            }
            Some(id) if matches!(self.nodes[id], Node::Sealed(Value::Array(_))) => {
                return Err(Error::extending_inline(line, keys.join(".")))
            }
            Some(_) => return Err(Error::not_a_list(line, keys.join("."))),
        };
        self.current = element;
        self.current_path = keys.to_vec();
        Ok(())
    }
}

fn freeze(nodes: &mut [Node], id: NodeId) -> Value {
    match std::mem::replace(&mut nodes[id], Node::TableArray(Vec::new())) {
        Node::Table { entries, .. } => Value::Table(freeze_table(nodes, entries)),
        Node::TableArray(elements) => Value::Array(
            elements
                .into_iter()
                .map(|element| freeze(nodes, element))
                .collect(),
        ),
        Node::Sealed(value) => value,
    }
}

fn freeze_table(nodes: &mut [Node], entries: IndexMap<String, NodeId>) -> Table {
    entries
        .into_iter()
        .map(|(key, id)| (key, freeze(nodes, id)))
        .collect()
}
