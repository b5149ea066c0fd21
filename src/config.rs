// ABOUTME: Version and REPL banner constants

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "lang-interp REPL v1.0";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for a small scripting language";
