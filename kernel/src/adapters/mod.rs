// Adapters
//
// Ways of handing parsed source files to the kernel.

pub mod snapshot;
