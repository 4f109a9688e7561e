//! Pure-function candidate naming and type/comment rendering.
//!
//! A [`CodeFormatter`] never touches the namespace: it only mints a
//! candidate string for a given `(desired name, attempt)` pair. Collision
//! resolution and uniqueness live in [`crate::namespace`].

use std::fmt::Write as _;

use gatery_hlim::ConnectionType;

/// The role a signal plays at the point its name is being minted, selecting
/// the default formatter's naming prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// An input port of the entity itself.
    EntityInput,
    /// An output port of the entity itself.
    EntityOutput,
    /// An input port of an instantiated child entity, as seen from the parent.
    ChildEntityInput,
    /// An output port of an instantiated child entity, as seen from the parent.
    ChildEntityOutput,
    /// The input side of a register (the value clocked in).
    RegisterInput,
    /// The output side of a register (the stored value).
    RegisterOutput,
    /// A purely local signal with no port role.
    LocalSignal,
    /// A local variable (used inside a process body).
    LocalVariable,
    /// A compile-time constant.
    Constant,
}

/// Behavior a VHDL code formatter must provide. Concrete formatters are
/// plain values held by the AST root — no dynamic node-kind dispatch beyond
/// this trait boundary.
pub trait CodeFormatter {
    /// The indentation unit (e.g. four spaces).
    fn indentation(&self) -> &str;

    /// The auto-generated-file banner prepended to every emitted file.
    fn file_header(&self) -> &str;

    /// The filename extension used for every emitted file, including the dot.
    fn filename_extension(&self) -> &str;

    /// Candidate name for a raw HLIM node (used when no signal name applies).
    fn node_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for a signal of the given kind.
    fn signal_name(&self, desired: &str, kind: SignalKind, attempt: u32) -> String;

    /// Candidate name for a package.
    fn package_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for an entity.
    fn entity_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for a block.
    fn block_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for a process; `clocked` selects the `_reg`/`_comb` suffix.
    fn process_name(&self, desired: &str, clocked: bool, attempt: u32) -> String;

    /// Candidate name for a clock.
    fn clock_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for an I/O pin.
    fn io_pin_name(&self, desired: &str, attempt: u32) -> String;

    /// Candidate name for a sub-entity instantiation.
    fn instance_name(&self, desired: &str, attempt: u32) -> String;

    /// Renders a connection type into `out` (e.g. `UNSIGNED(7 downto 0)`).
    fn format_connection_type(&self, out: &mut String, connection_type: ConnectionType, use_slv: bool);

    /// Writes a framed entity comment banner.
    fn format_entity_comment(&self, out: &mut String, entity_name: &str, comment: &str);

    /// Writes a framed, indented block comment banner. No-op if `comment` is empty.
    fn format_block_comment(&self, out: &mut String, block_name: &str, comment: &str);

    /// Writes an indented process comment. No-op if `comment` is empty.
    fn format_process_comment(&self, out: &mut String, indentation: usize, comment: &str);

    /// Writes an indented inline code comment. No-op if `comment` is empty.
    fn format_code_comment(&self, out: &mut String, indentation: usize, comment: &str);
}

fn attempt_suffixed(base: String, attempt: u32) -> String {
    if attempt == 0 {
        base
    } else {
        format!("{base}_{}", attempt + 1)
    }
}

fn non_empty_or(desired: &str, fallback: &str) -> String {
    if desired.is_empty() {
        fallback.to_string()
    } else {
        desired.to_string()
    }
}

fn indent(out: &mut String, depth: usize, unit: &str) {
    for _ in 0..depth {
        out.push_str(unit);
    }
}

/// The default, vendor-neutral VHDL code formatter.
pub struct DefaultCodeFormatting {
    indentation: String,
    file_header: String,
    filename_extension: String,
}

impl DefaultCodeFormatting {
    /// Creates the default formatter: four-space indentation, the standard
    /// auto-generated banner, and a `.vhd` filename extension.
    pub fn new() -> Self {
        Self {
            indentation: "    ".to_string(),
            file_header: "\n\
--------------------------------------------------------------------\n\
-- This file was auto generated. DO NOT MODIFY. Any changes made\n\
-- directly can not be brought back into the source material and\n\
-- will be lost upon regeneration.\n\
--------------------------------------------------------------------\n"
                .to_string(),
            filename_extension: ".vhd".to_string(),
        }
    }
}

impl Default for DefaultCodeFormatting {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeFormatter for DefaultCodeFormatting {
    fn indentation(&self) -> &str {
        &self.indentation
    }

    fn file_header(&self) -> &str {
        &self.file_header
    }

    fn filename_extension(&self) -> &str {
        &self.filename_extension
    }

    fn node_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "unnamed"), attempt)
    }

    fn signal_name(&self, desired: &str, kind: SignalKind, attempt: u32) -> String {
        let base = non_empty_or(desired, "unnamed");
        let named = match kind {
            SignalKind::EntityInput => format!("in_{base}"),
            SignalKind::EntityOutput => format!("out_{base}"),
            SignalKind::ChildEntityInput => format!("c_in_{base}"),
            SignalKind::ChildEntityOutput => format!("c_out_{base}"),
            SignalKind::RegisterInput => format!("r_in_{base}"),
            SignalKind::RegisterOutput => format!("r_out_{base}"),
            SignalKind::LocalSignal => format!("s_{base}"),
            SignalKind::LocalVariable => format!("v_{base}"),
            SignalKind::Constant => format!("C_{}", base.to_uppercase()),
        };
        attempt_suffixed(named, attempt)
    }

    fn package_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "UnnamedPackage"), attempt)
    }

    fn entity_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "UnnamedEntity"), attempt)
    }

    fn block_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "unnamedBlock"), attempt)
    }

    fn process_name(&self, desired: &str, clocked: bool, attempt: u32) -> String {
        let base = non_empty_or(desired, "unnamedProcess");
        let suffix = if clocked { "_reg" } else { "_comb" };
        if attempt == 0 {
            format!("{base}{suffix}")
        } else {
            format!("{base}_{}{suffix}", attempt + 1)
        }
    }

    fn clock_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "unnamedClock"), attempt)
    }

    fn io_pin_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "unnamedIoPin"), attempt)
    }

    fn instance_name(&self, desired: &str, attempt: u32) -> String {
        attempt_suffixed(non_empty_or(desired, "unnamedInstance"), attempt)
    }

    fn format_connection_type(&self, out: &mut String, connection_type: ConnectionType, use_slv: bool) {
        match connection_type {
            ConnectionType::Bool => out.push_str("STD_LOGIC"),
            ConnectionType::BitVec { width } => {
                out.push_str(if use_slv { "STD_LOGIC_VECTOR" } else { "UNSIGNED" });
                if width == 0 {
                    out.push_str("(-1 downto 0)");
                } else {
                    let _ = write!(out, "({} downto 0)", width - 1);
                }
            }
        }
    }

    fn format_entity_comment(&self, out: &mut String, entity_name: &str, comment: &str) {
        out.push_str("------------------------------------------------\n");
        let _ = writeln!(out, "--  Entity: {entity_name}");
        out.push_str("-- ");
        for c in comment.chars() {
            match c {
                '\n' => out.push_str("\n-- "),
                '\r' => {}
                c => out.push(c),
            }
        }
        out.push('\n');
        out.push_str("------------------------------------------------\n\n");
    }

    fn format_block_comment(&self, out: &mut String, _block_name: &str, comment: &str) {
        if comment.is_empty() {
            return;
        }
        indent(out, 1, &self.indentation);
        out.push_str("------------------------------------------------\n");
        indent(out, 1, &self.indentation);
        out.push_str("-- ");
        for c in comment.chars() {
            match c {
                '\n' => {
                    out.push('\n');
                    indent(out, 1, &self.indentation);
                    out.push_str("-- ");
                }
                '\r' => {}
                c => out.push(c),
            }
        }
        out.push('\n');
        indent(out, 1, &self.indentation);
        out.push_str("------------------------------------------------\n");
    }

    fn format_process_comment(&self, out: &mut String, indentation: usize, comment: &str) {
        if comment.is_empty() {
            return;
        }
        indent(out, indentation, &self.indentation);
        out.push_str("-- ");
        for c in comment.chars() {
            match c {
                '\n' => {
                    out.push('\n');
                    indent(out, indentation, &self.indentation);
                    out.push_str("-- ");
                }
                '\r' => {}
                c => out.push(c),
            }
        }
        out.push('\n');
    }

    fn format_code_comment(&self, out: &mut String, indentation: usize, comment: &str) {
        if comment.is_empty() {
            return;
        }
        let mut insert_header = true;
        for c in comment.chars() {
            match c {
                '\n' => insert_header = true,
                '\r' => {}
                c => {
                    if insert_header {
                        out.push('\n');
                        indent(out, indentation, &self.indentation);
                        out.push_str("-- ");
                        insert_header = false;
                    }
                    out.push(c);
                }
            }
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_name_prefixes() {
        let f = DefaultCodeFormatting::new();
        assert_eq!(f.signal_name("x", SignalKind::EntityInput, 0), "in_x");
        assert_eq!(f.signal_name("x", SignalKind::EntityOutput, 0), "out_x");
        assert_eq!(f.signal_name("x", SignalKind::RegisterOutput, 0), "r_out_x");
        assert_eq!(f.signal_name("x", SignalKind::LocalSignal, 0), "s_x");
        assert_eq!(f.signal_name("x", SignalKind::Constant, 0), "C_X");
    }

    #[test]
    fn empty_desired_name_falls_back() {
        let f = DefaultCodeFormatting::new();
        assert_eq!(f.signal_name("", SignalKind::LocalSignal, 0), "s_unnamed");
        assert_eq!(f.entity_name("", 0), "UnnamedEntity");
    }

    #[test]
    fn attempt_appends_suffix() {
        let f = DefaultCodeFormatting::new();
        assert_eq!(f.entity_name("foo", 0), "foo");
        assert_eq!(f.entity_name("foo", 1), "foo_2");
        assert_eq!(f.entity_name("foo", 2), "foo_3");
    }

    #[test]
    fn process_name_suffix_depends_on_clocked() {
        let f = DefaultCodeFormatting::new();
        assert_eq!(f.process_name("a2", false, 0), "a2_comb");
        assert_eq!(f.process_name("a2", true, 0), "a2_reg");
        assert_eq!(f.process_name("a2", true, 1), "a2_2_reg");
    }

    #[test]
    fn connection_type_rendering() {
        let f = DefaultCodeFormatting::new();
        let mut out = String::new();
        f.format_connection_type(&mut out, ConnectionType::Bool, false);
        assert_eq!(out, "STD_LOGIC");

        out.clear();
        f.format_connection_type(&mut out, ConnectionType::BitVec { width: 8 }, false);
        assert_eq!(out, "UNSIGNED(7 downto 0)");

        out.clear();
        f.format_connection_type(&mut out, ConnectionType::BitVec { width: 8 }, true);
        assert_eq!(out, "STD_LOGIC_VECTOR(7 downto 0)");

        out.clear();
        f.format_connection_type(&mut out, ConnectionType::BitVec { width: 0 }, false);
        assert_eq!(out, "UNSIGNED(-1 downto 0)");
    }

    #[test]
    fn entity_comment_framing() {
        let f = DefaultCodeFormatting::new();
        let mut out = String::new();
        f.format_entity_comment(&mut out, "top", "line one\nline two");
        assert!(out.contains("--  Entity: top"));
        assert!(out.contains("-- line one"));
        assert!(out.contains("-- line two"));
    }

    #[test]
    fn empty_comment_emits_nothing() {
        let f = DefaultCodeFormatting::new();
        let mut out = String::new();
        f.format_block_comment(&mut out, "b", "");
        assert!(out.is_empty());
    }
}
