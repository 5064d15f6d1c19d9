/// Why a drawing script could not be run to completion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// The script could not be tokenized or parsed.
    #[error("SyntaxError on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The script threw while running, e.g. `TypeError: x is not a function`.
    #[error("{0}")]
    Runtime(String),

    /// The script ran longer than its step budget allows.
    #[error("Script exceeded its budget of {0} steps")]
    BudgetExceeded(u64),
}
