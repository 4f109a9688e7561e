//! The VHDL back-end core: translates a finalized HLIM circuit into a
//! hierarchy of VHDL entities, architectures, processes, and packages.
//!
//! [`Ast::convert`] builds the AST from a [`gatery_hlim::Circuit`];
//! [`Ast::write_vhdl`] drives emission to disk under one of three
//! [`WriteMode`]s.

#![warn(missing_docs)]

pub mod ast;
pub mod classify;
pub mod error;
pub mod formatter;
pub mod grouping;
pub mod namespace;
pub mod package;
pub mod process;

pub use ast::{Ast, WriteMode};
pub use error::{VhdlError, VhdlResult};
pub use formatter::{CodeFormatter, DefaultCodeFormatting, SignalKind};
pub use grouping::{Entity, Grouping};
pub use namespace::{Namespaces, ScopeId};
pub use package::{BitConstant, BitVecConstant, HelperPackage, InterfacePackage, InterfacePackageContent, NaturalConstant, Package};
