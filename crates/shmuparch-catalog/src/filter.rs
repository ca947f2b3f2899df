//! Query parsing and filtering
//!
//! A query is split on whitespace and every token must match. Tokens are
//! either typed predicates or free text:
//!
//! | Token      | Meaning                                          |
//! |------------|--------------------------------------------------|
//! | `q>7`      | quality above 7 (`<`, `=`, `:` also accepted)    |
//! | `d<5`      | unified difficulty below 5                       |
//! | `r:med`    | routing label contains "med" (low/medium/high)   |
//! | `dev:cave` | developer contains "cave"                        |
//! | `garegga`  | title, alias or any ROM key contains "garegga"   |
//!
//! Anything that does not parse as a predicate, including unknown tags and
//! non-numeric values for `q`/`d`, is matched as free text.

use crate::LogicalEntry;

/// Field a predicate tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Quality,
    Difficulty,
    Routing,
    Developer,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equals,
    LessThan,
    GreaterThan,
    Contains,
}

/// Literal a predicate compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(u8),
    /// Lowercased text
    Text(String),
}

/// A typed query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub field: Field,
    pub op: Op,
    pub value: Literal,
}

/// One classified query token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Lowercased substring matched against title, aliases and ROM keys
    FreeText(String),
    Tagged(FilterPredicate),
}

/// A parsed query: the conjunction of its tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<Token>,
}

impl Query {
    pub fn parse(text: &str) -> Self {
        let tokens = text
            .split_whitespace()
            .map(|t| classify(&t.to_lowercase()))
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// An empty query matches everything
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches(&self, entry: &LogicalEntry) -> bool {
        self.tokens.iter().all(|token| token.matches(entry))
    }

    /// Entries matching every token, in input order
    pub fn filter<'a, I>(&self, entries: I) -> Vec<&'a LogicalEntry>
    where
        I: IntoIterator<Item = &'a LogicalEntry>,
    {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Parse `query` and return the matching entries in input order
pub fn apply<'a, I>(query: &str, entries: I) -> Vec<&'a LogicalEntry>
where
    I: IntoIterator<Item = &'a LogicalEntry>,
{
    Query::parse(query).filter(entries)
}

/// Drop entries with no available ROM unless `include_missing` is set
pub fn visible<'a, I>(entries: I, include_missing: bool) -> Vec<&'a LogicalEntry>
where
    I: IntoIterator<Item = &'a LogicalEntry>,
{
    entries
        .into_iter()
        .filter(|e| include_missing || e.is_available())
        .collect()
}

fn classify(token: &str) -> Token {
    parse_predicate(token)
        .map(Token::Tagged)
        .unwrap_or_else(|| Token::FreeText(token.to_string()))
}

fn parse_predicate(token: &str) -> Option<FilterPredicate> {
    let split = token.find([':', '<', '>', '='])?;
    let (tag, rest) = token.split_at(split);
    let mut chars = rest.chars();
    let op_char = chars.next()?;
    let value = chars.as_str();
    if value.is_empty() {
        return None;
    }

    match tag {
        "q" | "d" => {
            let op = match op_char {
                '<' => Op::LessThan,
                '>' => Op::GreaterThan,
                _ => Op::Equals,
            };
            let number = value.parse::<u8>().ok()?;
            let field = if tag == "q" {
                Field::Quality
            } else {
                Field::Difficulty
            };
            Some(FilterPredicate {
                field,
                op,
                value: Literal::Number(number),
            })
        }
        "r" | "dev" if matches!(op_char, ':' | '=') => {
            let field = if tag == "r" {
                Field::Routing
            } else {
                Field::Developer
            };
            Some(FilterPredicate {
                field,
                op: Op::Contains,
                value: Literal::Text(value.to_string()),
            })
        }
        _ => None,
    }
}

impl Token {
    pub fn matches(&self, entry: &LogicalEntry) -> bool {
        match self {
            Token::FreeText(text) => free_text_matches(text, entry),
            Token::Tagged(predicate) => predicate.matches(entry),
        }
    }
}

impl FilterPredicate {
    pub fn matches(&self, entry: &LogicalEntry) -> bool {
        let def = entry.definition();
        match (&self.field, &self.value) {
            (Field::Quality, Literal::Number(n)) => compare(def.quality, self.op, *n),
            (Field::Difficulty, Literal::Number(n)) => compare(entry.difficulty(), self.op, *n),
            (Field::Routing, Literal::Text(text)) => def.routing.label().contains(text.as_str()),
            (Field::Developer, Literal::Text(text)) => {
                def.developer.to_lowercase().contains(text.as_str())
            }
            _ => false,
        }
    }
}

/// Unrated values never satisfy a numeric predicate
fn compare(actual: Option<u8>, op: Op, expected: u8) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match op {
        Op::Equals => actual == expected,
        Op::LessThan => actual < expected,
        Op::GreaterThan => actual > expected,
        Op::Contains => false,
    }
}

fn free_text_matches(text: &str, entry: &LogicalEntry) -> bool {
    let def = entry.definition();
    def.title.to_lowercase().contains(text)
        || def.variants.iter().any(|v| v.rom.to_lowercase().contains(text))
        || def.aliases.iter().any(|a| a.to_lowercase().contains(text))
}
