mod directives;
mod errors;
mod mutations;
mod variables;
