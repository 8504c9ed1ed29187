//! Deferred member enumeration for bean declarations.

use typeweave_common::Settings;

use crate::universe::{ClassDecl, Declaration, MethodKind};

/// Decides which members of a declaration contribute to its bean.
///
/// The parser resolves every member returned here through the processor chain
/// with that member as the context member.
pub trait MemberEnumerator {
    /// Members of `decl` to emit, in declaration order.
    fn enumerate<'u>(&self, decl: &'u ClassDecl, settings: &Settings) -> Vec<Declaration<'u>>;
}

/// Enumerates declared fields, methods and tagged constructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredMembers;

impl DeclaredMembers {
    fn method_enabled(kind: MethodKind, settings: &Settings) -> bool {
        match kind {
            MethodKind::Abstract => settings.emit_abstract_methods,
            MethodKind::Default => settings.emit_default_methods,
            MethodKind::Static => settings.emit_static_methods,
            MethodKind::Concrete => settings.emit_other_methods,
        }
    }
}

/// Apply the include/exclude marker settings.
///
/// Include markers on the owning type admit all of its members.
fn passes_marker_filter(owner: &ClassDecl, markers: &[String], settings: &Settings) -> bool {
    fn has_any(wanted: &[String], markers: &[String]) -> bool {
        markers.iter().any(|m| wanted.contains(m))
    }

    if has_any(&settings.exclude_member_markers, markers) {
        return false;
    }
    settings.include_member_markers.is_empty()
        || has_any(&settings.include_member_markers, markers)
        || has_any(&settings.include_member_markers, &owner.markers)
}

impl MemberEnumerator for DeclaredMembers {
    fn enumerate<'u>(&self, decl: &'u ClassDecl, settings: &Settings) -> Vec<Declaration<'u>> {
        let mut members = Vec::new();

        for field in &decl.fields {
            if !field.is_static && passes_marker_filter(decl, &field.markers, settings) {
                members.push(Declaration::Field { owner: decl, field });
            }
        }

        for method in &decl.methods {
            if Self::method_enabled(method.kind, settings)
                && passes_marker_filter(decl, &method.markers, settings)
            {
                members.push(Declaration::Method {
                    owner: decl,
                    method,
                });
            }
        }

        // Untagged constructors have no TypeScript counterpart
        for ctor in &decl.constructors {
            if !ctor.tags.is_empty() && passes_marker_filter(decl, &ctor.markers, settings) {
                members.push(Declaration::Constructor { owner: decl, ctor });
            }
        }

        members
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::source::TypeName;
    use crate::universe::TypeUniverse;

    const MEMBERS_JSON: &str = r#"{
  "classes": {
    "demo.Mixed": {
      "fields": [
        { "name": "id", "ty": "String" },
        { "name": "COUNT", "ty": "int", "is_static": true },
        { "name": "secret", "ty": "String", "markers": ["ApiExclude"] },
        { "name": "exported", "ty": "String", "markers": ["Export"] }
      ],
      "methods": [
        { "name": "run", "kind": "abstract" },
        { "name": "helper", "kind": "default" },
        { "name": "create", "kind": "static" },
        { "name": "compute" }
      ],
      "constructors": [
        { "params": [{ "ty": "String" }] },
        { "tags": [{ "verbatim": { "text": "constructor(id: string)" } }] }
      ]
    },
    "demo.Marked": {
      "markers": ["Export"],
      "fields": [{ "name": "x", "ty": "int" }]
    }
  }
}"#;

    fn names(members: &[Declaration<'_>]) -> Vec<String> {
        members
            .iter()
            .map(|m| m.member_name().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_defaults_emit_instance_fields_only() {
        let universe = TypeUniverse::from_json(MEMBERS_JSON).unwrap();
        let decl = universe.get(&TypeName::new("demo.Mixed")).unwrap();
        let members = DeclaredMembers.enumerate(decl, &Settings::default());
        assert_eq!(names(&members), vec!["id", "secret", "exported", "<init>"]);
    }

    #[test]
    fn test_method_categories_and_exclusions() {
        let universe = TypeUniverse::from_json(MEMBERS_JSON).unwrap();
        let decl = universe.get(&TypeName::new("demo.Mixed")).unwrap();
        let settings = Settings {
            emit_abstract_methods: true,
            emit_static_methods: true,
            exclude_member_markers: vec!["ApiExclude".into()],
            ..Settings::default()
        };
        let members = DeclaredMembers.enumerate(decl, &settings);
        assert_eq!(names(&members), vec!["id", "exported", "run", "create", "<init>"]);
    }

    #[test]
    fn test_include_markers() {
        let universe = TypeUniverse::from_json(MEMBERS_JSON).unwrap();
        let settings = Settings {
            include_member_markers: vec!["Export".into()],
            ..Settings::default()
        };
        let mixed = universe.get(&TypeName::new("demo.Mixed")).unwrap();
        assert_eq!(names(&DeclaredMembers.enumerate(mixed, &settings)), vec!["exported"]);

        // A marker on the type admits every member
        let marked = universe.get(&TypeName::new("demo.Marked")).unwrap();
        assert_eq!(names(&DeclaredMembers.enumerate(marked, &settings)), vec!["x"]);
    }
}
