//! Writes the constraints file: timing exceptions and vendor-specific
//! path attributes declared anywhere in the design.
//!
//! Grounded on `SynthesisTool::writeConstraintFile`/`forEachPathAttribute`
//! (`SynthesisTool.cpp`): walk every node group's [`PathAttribute`]s,
//! resolve each endpoint to an identifier via [`crate::paths`], and emit one
//! line per attribute. `$src`/`$end` templated user-defined attributes are
//! filtered by vendor exactly as [`crate::adapter::add_user_defined_attributes`]
//! filters ordinary attribute maps.

use std::io::Write as _;

use gatery_hlim::group::PathAttributeKind;
use gatery_vhdl::Ast;

use crate::error::{SynthAdapterError, SynthAdapterResult};
use crate::paths::resolve_identifier;

/// Renders the constraints file body for every path attribute in `ast`'s
/// circuit, filtering user-defined templated attributes by `vendors`.
pub fn render_constraints(ast: &Ast, vendors: &[String]) -> SynthAdapterResult<String> {
    let mut out = String::new();
    out.push_str("# List of constraints:\n");

    for (_, group) in ast.circuit().groups() {
        for attrib in &group.attributes.path_attributes {
            let start = resolve_identifier(ast, attrib.start)?;
            let end = resolve_identifier(ast, attrib.end)?;
            match &attrib.kind {
                PathAttributeKind::FalsePath => {
                    out.push_str(&format!("false path: {start} --- {end}\n"));
                }
                PathAttributeKind::MultiCycle(cycles) => {
                    out.push_str(&format!("multi cycle({cycles}): {start} --- {end}\n"));
                }
                PathAttributeKind::UserDefined(_) => {
                    // Rendered below via the vendor-specific templates on the
                    // owning group's own attribute bag, matching the
                    // original's separate `writeUserDefinedPathAttributes` pass.
                }
            }
        }
    }

    for (_, group) in ast.circuit().groups() {
        for vendor in vendors {
            let Some(per_vendor) = group.attributes.vendor_specific.get(vendor) else {
                continue;
            };
            for template in per_vendor.values() {
                for attrib in &group.attributes.path_attributes {
                    if let PathAttributeKind::UserDefined(attrib_template) = &attrib.kind {
                        if attrib_template != template {
                            continue;
                        }
                        let start = resolve_identifier(ast, attrib.start)?;
                        let end = resolve_identifier(ast, attrib.end)?;
                        let line = template.replace("$src", &start).replace("$end", &end);
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Writes the rendered constraints file to `path`.
pub fn write_constraint_file(ast: &Ast, vendors: &[String], path: &std::path::Path) -> SynthAdapterResult<()> {
    let content = render_constraints(ast, vendors)?;
    let mut file = std::fs::File::create(path).map_err(|e| SynthAdapterError::io(path, e))?;
    file.write_all(content.as_bytes()).map_err(|e| SynthAdapterError::io(path, e))
}
