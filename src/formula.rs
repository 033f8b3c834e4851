use thiserror::Error;

use crate::api::types::NewFormula;

/// Formula a fresh draft starts with.
pub const DEFAULT_FORMULA: &str = "Total Sales * (1 - (Discount Percentage / 100))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }
}

/// One piece appended by the builder buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaToken {
    Variable(String),
    Operator(Operator),
    Number(String),
    OpenParen,
    CloseParen,
}

impl FormulaToken {
    fn text(&self) -> &str {
        match self {
            FormulaToken::Variable(name) | FormulaToken::Number(name) => name,
            FormulaToken::Operator(op) => op.symbol(),
            FormulaToken::OpenParen => "(",
            FormulaToken::CloseParen => ")",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Formula name is required")]
    MissingName,
    #[error("Formula is required")]
    MissingFormula,
}

/// The "create formula" form. The formula text stays freely editable; the
/// builder only appends to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaDraft {
    pub name: String,
    pub description: String,
    pub formula: String,
}

impl Default for FormulaDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            formula: DEFAULT_FORMULA.to_string(),
        }
    }
}

impl FormulaDraft {
    /// Append a token, separated by one space except right after `(` and
    /// right before `)`.
    pub fn push(&mut self, token: &FormulaToken) {
        let text = token.text();
        let trimmed_len = self.formula.trim_end().len();
        self.formula.truncate(trimmed_len);
        let tight = self.formula.is_empty()
            || self.formula.ends_with('(')
            || matches!(token, FormulaToken::CloseParen);
        if !tight {
            self.formula.push(' ');
        }
        self.formula.push_str(text);
    }

    pub fn reset_formula(&mut self) {
        self.formula = DEFAULT_FORMULA.to_string();
    }

    pub fn clear_formula(&mut self) {
        self.formula.clear();
    }

    /// `(` count minus `)` count. Shown as a hint only; the backend owns
    /// validation.
    pub fn open_parens(&self) -> i64 {
        self.formula.chars().fold(0, |depth, c| match c {
            '(' => depth + 1,
            ')' => depth - 1,
            _ => depth,
        })
    }

    /// Trimmed request body, or why the form can't be submitted yet.
    pub fn to_request(&self) -> Result<NewFormula, FormulaError> {
        let name = self.name.trim();
        let formula = self.formula.trim();
        if name.is_empty() {
            return Err(FormulaError::MissingName);
        }
        if formula.is_empty() {
            return Err(FormulaError::MissingFormula);
        }
        Ok(NewFormula {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            formula_string: formula.to_string(),
        })
    }
}
