use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use walkdir::WalkDir;

use interpolate::{Expression, ExpressionItem, Modifier};

pub type AnyRes<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TestCase {
    Success {
        desc: String,
        input: String,
        expected: Vec<TestItem>,
    },
    Error {
        desc: String,
        input: String,
        error: String,
    },
}

impl std::fmt::Display for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { desc, .. } | Self::Error { desc, .. } => f.write_str(desc),
        }
    }
}

/// JSON mirror of the AST, so fixture files stay independent of the crate's
/// own type shapes.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TestItem {
    Text { text: String },
    Expansion { expansion: TestExpansion },
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct TestExpansion {
    pub identifier: String,
    #[serde(default)]
    pub modifiers: Vec<TestModifier>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "op")]
pub enum TestModifier {
    #[serde(rename = ":-")]
    EmptyValue { content: Vec<TestItem> },
    #[serde(rename = "-")]
    UnsetValue { content: Vec<TestItem> },
    #[serde(rename = "?")]
    Required { message: Vec<TestItem> },
    #[serde(rename = ":")]
    Substring { offset: i64, length: Option<i64> },
}

pub fn to_test_items(expression: &Expression) -> Vec<TestItem> {
    expression.items().iter().map(to_test_item).collect()
}

fn to_test_item(item: &ExpressionItem) -> TestItem {
    match item {
        ExpressionItem::Text(text) => TestItem::Text { text: text.clone() },
        ExpressionItem::Expansion(expansion) => TestItem::Expansion {
            expansion: TestExpansion {
                identifier: expansion.identifier.clone(),
                modifiers: expansion.modifiers.iter().map(to_test_modifier).collect(),
            },
        },
    }
}

fn to_test_modifier(modifier: &Modifier) -> TestModifier {
    match modifier {
        Modifier::EmptyValue { content, .. } => TestModifier::EmptyValue {
            content: to_test_items(content),
        },
        Modifier::UnsetValue { content, .. } => TestModifier::UnsetValue {
            content: to_test_items(content),
        },
        Modifier::Required { message, .. } => TestModifier::Required {
            message: to_test_items(message),
        },
        Modifier::Substring { offset, length, .. } => TestModifier::Substring {
            offset: *offset,
            length: *length,
        },
    }
}

pub fn collect_spec_files(dir: impl AsRef<Path>) -> AnyRes<Vec<PathBuf>> {
    let project_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let root = PathBuf::from(project_dir).join("tests/resources").join(dir);
    let mut paths: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();
    Ok(paths)
}

pub fn load_spec_file(path: &Path) -> AnyRes<Vec<TestCase>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data: Vec<TestCase> = serde_json::from_reader(reader)?;
    Ok(data)
}
