//! Helper and interface packages: a fixed conversion-function package,
//! plus caller-supplied named constants exposed to an external integrator.

use std::fmt::Write as _;

use gatery_common::LogicVec;

use crate::formatter::CodeFormatter;
use crate::namespace::{Namespaces, ScopeId};

/// The fixed conversion-function package, always emitted first.
#[derive(Debug, Clone)]
pub struct HelperPackage {
    /// The package's allocated name.
    pub name: String,
}

impl HelperPackage {
    /// Allocates the helper package's name against `scope` (always the root
    /// namespace in practice) and builds its fixed content.
    pub fn build(namespaces: &mut Namespaces, scope: ScopeId, formatter: &dyn CodeFormatter) -> Self {
        let name = namespaces.allocate_package_name(scope, formatter, "gatery_helpers");
        Self { name }
    }

    /// Renders the package declaration and body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let name = &self.name;
        let _ = writeln!(out, "PACKAGE {name} IS");
        let _ = writeln!(out, "    FUNCTION to_std_logic(value : BOOLEAN) RETURN STD_LOGIC;");
        let _ = writeln!(out, "    FUNCTION to_boolean(value : STD_LOGIC) RETURN BOOLEAN;");
        let _ = writeln!(out, "    FUNCTION to_std_logic_vector(value : UNSIGNED) RETURN STD_LOGIC_VECTOR;");
        let _ = writeln!(out, "    FUNCTION to_unsigned(value : STD_LOGIC_VECTOR) RETURN UNSIGNED;");
        let _ = writeln!(out, "    FUNCTION to_std_logic(value : BIT) RETURN STD_LOGIC;");
        let _ = writeln!(out, "    FUNCTION to_bit(value : STD_LOGIC) RETURN BIT;");
        let _ = writeln!(out, "END PACKAGE {name};");
        out.push('\n');
        let _ = writeln!(out, "PACKAGE BODY {name} IS");
        let _ = writeln!(out, "    FUNCTION to_std_logic(value : BOOLEAN) RETURN STD_LOGIC IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        IF value THEN RETURN '1'; ELSE RETURN '0'; END IF;");
        let _ = writeln!(out, "    END FUNCTION;");
        out.push('\n');
        let _ = writeln!(out, "    FUNCTION to_boolean(value : STD_LOGIC) RETURN BOOLEAN IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        RETURN value = '1';");
        let _ = writeln!(out, "    END FUNCTION;");
        out.push('\n');
        let _ = writeln!(out, "    FUNCTION to_std_logic_vector(value : UNSIGNED) RETURN STD_LOGIC_VECTOR IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        RETURN STD_LOGIC_VECTOR(value);");
        let _ = writeln!(out, "    END FUNCTION;");
        out.push('\n');
        let _ = writeln!(out, "    FUNCTION to_unsigned(value : STD_LOGIC_VECTOR) RETURN UNSIGNED IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        RETURN UNSIGNED(value);");
        let _ = writeln!(out, "    END FUNCTION;");
        out.push('\n');
        let _ = writeln!(out, "    FUNCTION to_std_logic(value : BIT) RETURN STD_LOGIC IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        IF value = '1' THEN RETURN '1'; ELSE RETURN '0'; END IF;");
        let _ = writeln!(out, "    END FUNCTION;");
        out.push('\n');
        let _ = writeln!(out, "    FUNCTION to_bit(value : STD_LOGIC) RETURN BIT IS");
        let _ = writeln!(out, "    BEGIN");
        let _ = writeln!(out, "        IF value = '1' THEN RETURN '1'; ELSE RETURN '0'; END IF;");
        let _ = writeln!(out, "    END FUNCTION;");
        let _ = writeln!(out, "END PACKAGE BODY {name};");
        out
    }
}

/// A single named natural-number constant.
#[derive(Debug, Clone)]
pub struct NaturalConstant {
    /// The constant's identifier.
    pub name: String,
    /// Its value.
    pub value: u64,
    /// An optional short explanatory comment.
    pub comment: Option<String>,
}

/// A single named bit-vector constant.
#[derive(Debug, Clone)]
pub struct BitVecConstant {
    /// The constant's identifier.
    pub name: String,
    /// Its value, including width (width 0 renders with no initializer).
    pub value: LogicVec,
    /// An optional short explanatory comment.
    pub comment: Option<String>,
}

/// A single named single-bit constant.
#[derive(Debug, Clone)]
pub struct BitConstant {
    /// The constant's identifier.
    pub name: String,
    /// Its value.
    pub value: bool,
    /// An optional short explanatory comment.
    pub comment: Option<String>,
}

/// The caller-supplied content of an interface package, grouped by category.
/// Emission always renders naturals, then bit vectors, then bits, each
/// category sorted by name for determinism.
#[derive(Debug, Clone, Default)]
pub struct InterfacePackageContent {
    /// Natural-number constants.
    pub naturals: Vec<NaturalConstant>,
    /// Bit-vector constants.
    pub bitvecs: Vec<BitVecConstant>,
    /// Single-bit constants.
    pub bits: Vec<BitConstant>,
}

/// A user-defined package of named constants exposed to an external
/// integrator (e.g. memory-mapped register offsets).
#[derive(Debug, Clone)]
pub struct InterfacePackage {
    /// The package's allocated name.
    pub name: String,
    /// Its constant content.
    pub content: InterfacePackageContent,
}

impl InterfacePackage {
    /// Allocates the package's name and attaches `content`.
    pub fn build(
        namespaces: &mut Namespaces,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        desired_name: &str,
        content: InterfacePackageContent,
    ) -> Self {
        let name = namespaces.allocate_package_name(scope, formatter, desired_name);
        Self { name, content }
    }

    fn emit_comment(out: &mut String, comment: &Option<String>) {
        if let Some(comment) = comment {
            let _ = writeln!(out, "    -- {comment}");
        }
    }

    /// Renders the package declaration (interface packages carry no body:
    /// every constant is initialized in its declaration).
    pub fn render(&self, formatter: &dyn CodeFormatter) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "PACKAGE {} IS", self.name);

        let mut naturals = self.content.naturals.clone();
        naturals.sort_by(|a, b| a.name.cmp(&b.name));
        for c in &naturals {
            Self::emit_comment(&mut out, &c.comment);
            let _ = writeln!(out, "    CONSTANT {} : NATURAL := {};", c.name, c.value);
        }

        let mut bitvecs = self.content.bitvecs.clone();
        bitvecs.sort_by(|a, b| a.name.cmp(&b.name));
        for c in &bitvecs {
            Self::emit_comment(&mut out, &c.comment);
            let mut type_str = String::new();
            formatter.format_connection_type(
                &mut type_str,
                gatery_hlim::ConnectionType::BitVec { width: c.value.width() as usize },
                false,
            );
            if c.value.width() == 0 {
                let _ = writeln!(out, "    CONSTANT {} : {};", c.name, type_str);
            } else {
                let _ = writeln!(out, "    CONSTANT {} : {} := \"{}\";", c.name, type_str, c.value);
            }
        }

        let mut bits = self.content.bits.clone();
        bits.sort_by(|a, b| a.name.cmp(&b.name));
        for c in &bits {
            Self::emit_comment(&mut out, &c.comment);
            let literal = if c.value { "'1'" } else { "'0'" };
            let _ = writeln!(out, "    CONSTANT {} : STD_LOGIC := {literal};", c.name);
        }

        let _ = writeln!(out, "END PACKAGE {};", self.name);
        out
    }
}

/// A package owned by the AST root. Mirrors the source's `Package ←
/// HelperPackage`/`InterfacePackage` inheritance as tagged variants of one
/// sum type.
#[derive(Debug, Clone)]
pub enum Package {
    /// The fixed conversion-function package.
    Helper(HelperPackage),
    /// A caller-supplied named-constants package.
    Interface(InterfacePackage),
    /// A pre-rendered package supplied verbatim (escape hatch for content
    /// this core does not model, e.g. vendor primitive wrappers).
    UserDefined {
        /// The package's name, used for file-per-entity naming.
        name: String,
        /// Its full rendered text.
        text: String,
    },
}

impl Package {
    /// The package's allocated name.
    pub fn name(&self) -> &str {
        match self {
            Package::Helper(p) => &p.name,
            Package::Interface(p) => &p.name,
            Package::UserDefined { name, .. } => name,
        }
    }

    /// Renders the package's full text.
    pub fn render(&self, formatter: &dyn CodeFormatter) -> String {
        match self {
            Package::Helper(p) => p.render(),
            Package::Interface(p) => p.render(formatter),
            Package::UserDefined { text, .. } => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DefaultCodeFormatting;

    #[test]
    fn helper_package_declares_conversions() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let pkg = HelperPackage::build(&mut ns, root, &f);
        let text = pkg.render();
        assert!(text.contains("FUNCTION to_std_logic(value : BOOLEAN)"));
        assert!(text.contains(&pkg.name));
    }

    #[test]
    fn interface_package_sorts_and_renders_categories() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let content = InterfacePackageContent {
            naturals: vec![
                NaturalConstant { name: "B_COUNT".into(), value: 2, comment: None },
                NaturalConstant { name: "A_COUNT".into(), value: 1, comment: Some("first".into()) },
            ],
            bitvecs: vec![BitVecConstant {
                name: "EMPTY_MASK".into(),
                value: LogicVec::all_zero(0),
                comment: None,
            }],
            bits: vec![BitConstant { name: "ENABLE".into(), value: true, comment: None }],
        };
        let pkg = InterfacePackage::build(&mut ns, root, &f, "regs", content);
        let text = pkg.render(&f);
        let a_idx = text.find("A_COUNT").unwrap();
        let b_idx = text.find("B_COUNT").unwrap();
        assert!(a_idx < b_idx);
        assert!(text.contains("EMPTY_MASK : UNSIGNED(-1 downto 0);"));
        assert!(text.contains("ENABLE : STD_LOGIC := '1';"));
    }
}
