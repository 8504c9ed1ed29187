//! TypeScript code emission via the Emit trait.
//!
//! Type nodes implement `Emit` directly. Declarations depend on the indent
//! setting, so they expose `emit_indented` instead, and [`emit_model`]
//! assembles the whole output file.

use typeweave_common::Settings;

use super::types::{TsParam, TsPrimitive, TsType};
use super::utils::{quote_if_needed, sanitize_param_name, string_literal};
use crate::model::{BeanModel, EnumModel, ExternalDeclaration, MethodModel, Model, PropertyModel};

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Void => "void".to_string(),
            TsPrimitive::Any => "any".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Function types bind looser than []
                if matches!(**inner, TsType::Function { .. }) {
                    format!("({})[]", inner_str)
                } else {
                    format!("{}[]", inner_str)
                }
            }
            TsType::Record(value) => format!("Record<string, {}>", value.emit()),
            TsType::Reference { symbol, args } => {
                if args.is_empty() {
                    symbol.name().to_string()
                } else {
                    let args_str = args.iter().map(|a| a.emit()).collect::<Vec<_>>().join(", ");
                    format!("{}<{}>", symbol.name(), args_str)
                }
            }
            TsType::TypeVariable(name) => name.clone(),
            TsType::Function { params, ret } => {
                let params_str = params.iter().map(|p| p.emit()).collect::<Vec<_>>().join(", ");
                format!("({}) => {}", params_str, ret.emit())
            }
            TsType::Verbatim(text) => text.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        format!("{}: {}", sanitize_param_name(&self.name), self.ty.emit())
    }
}

// =============================================================================
// Members
// =============================================================================

impl PropertyModel {
    /// One property line, preceded by its doc comment.
    pub fn emit_indented(&self, indent: &str) -> String {
        let mut output = emit_comments(&self.comments, indent);
        match &self.ty {
            TsType::Verbatim(text) => output.push_str(&format!("{}{};\n", indent, text)),
            ty => {
                let opt = if self.optional { "?" } else { "" };
                output.push_str(&format!(
                    "{}{}{}: {};\n",
                    indent,
                    quote_if_needed(&self.name),
                    opt,
                    ty.emit()
                ));
            }
        }
        output
    }
}

impl MethodModel {
    /// Methods are separated from the previous member by a blank line.
    pub fn emit_indented(&self, indent: &str) -> String {
        let mut output = String::from("\n");
        output.push_str(&emit_comments(&self.comments, indent));
        match &self.ret {
            // Override text is the whole signature
            TsType::Verbatim(text) => output.push_str(&format!("{}{};\n", indent, text)),
            ret => {
                let static_str = if self.is_static { "static " } else { "" };
                let opt = if self.optional { "?" } else { "" };
                let params_str = self.params.iter().map(|p| p.emit()).collect::<Vec<_>>().join(", ");
                output.push_str(&format!(
                    "{}{}{}{}({}): {};\n",
                    indent,
                    static_str,
                    self.name,
                    opt,
                    params_str,
                    ret.emit()
                ));
            }
        }
        output
    }
}

fn emit_comments(comments: &[String], indent: &str) -> String {
    match comments {
        [] => String::new(),
        [single] if !single.contains('\n') => format!("{}/** {} */\n", indent, single.trim()),
        lines => {
            let mut output = format!("{}/**\n", indent);
            for line in lines.iter().flat_map(|c| c.lines()) {
                if line.trim().is_empty() {
                    output.push_str(&format!("{} *\n", indent));
                } else {
                    output.push_str(&format!("{} * {}\n", indent, line.trim()));
                }
            }
            output.push_str(&format!("{} */\n", indent));
            output
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl BeanModel {
    fn header(&self) -> String {
        if let Some(signature) = &self.signature {
            return signature.clone();
        }
        let mut header = format!("interface {}", self.symbol.name());
        if !self.type_params.is_empty() {
            header.push_str(&format!("<{}>", self.type_params.join(", ")));
        }
        if !self.extends.is_empty() {
            let parents = self.extends.iter().map(|t| t.emit()).collect::<Vec<_>>().join(", ");
            header.push_str(&format!(" extends {}", parents));
        }
        header
    }

    /// The whole interface declaration; members are indented by `indent`.
    pub fn emit_indented(&self, indent: &str) -> String {
        let mut output = emit_comments(&self.comments, "");
        output.push_str(&format!("{} {{\n", self.header()));
        for prop in &self.properties {
            output.push_str(&prop.emit_indented(indent));
        }
        for method in &self.methods {
            output.push_str(&method.emit_indented(indent));
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for EnumModel {
    fn emit(&self) -> String {
        let header = self
            .signature
            .clone()
            .unwrap_or_else(|| format!("type {}", self.symbol.name()));
        let union = if self.members.is_empty() {
            "never".to_string()
        } else {
            self.members
                .iter()
                .map(|m| string_literal(&m.display_name))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let mut output = emit_comments(&self.comments, "");
        output.push_str(&format!("{} = {};\n", header, union));
        output
    }
}

impl Emit for ExternalDeclaration {
    fn emit(&self) -> String {
        if self.body.ends_with('\n') {
            self.body.clone()
        } else {
            format!("{}\n", self.body)
        }
    }
}

/// Render every declaration in `model`, each preceded by a blank line.
pub fn emit_model(model: &Model, settings: &Settings) -> String {
    let mut declarations: Vec<(String, String)> = Vec::new();
    for bean in model.beans() {
        let mut bean = bean.clone();
        if settings.sort_members {
            bean.properties.sort_by(|a, b| a.name.cmp(&b.name));
            bean.methods.sort_by(|a, b| a.name.cmp(&b.name));
        }
        declarations.push((bean.symbol.name().to_string(), bean.emit_indented(&settings.indent)));
    }
    for enum_model in model.enums() {
        declarations.push((enum_model.symbol.name().to_string(), enum_model.emit()));
    }
    for external in model.externals() {
        declarations.push((external.name.clone(), external.emit()));
    }

    if settings.sort_declarations {
        declarations.sort_by(|a, b| a.0.cmp(&b.0));
    }

    let mut output = String::new();
    for (_, text) in declarations {
        output.push('\n');
        output.push_str(&text);
    }
    output
}
