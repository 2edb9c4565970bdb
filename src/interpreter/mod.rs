pub mod backend;
pub mod backends;

pub use backend::{Interpreter, InterpreterError, OutputCallback};
pub use backends::{DisabledInterpreter, PythonInterpreter};
