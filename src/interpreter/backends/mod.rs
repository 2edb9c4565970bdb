pub mod disabled;
pub mod python;

pub use disabled::DisabledInterpreter;
pub use python::PythonInterpreter;
