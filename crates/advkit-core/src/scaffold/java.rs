use super::{
    pascal_case, require_identifier, require_qualified, validate_fields, Field, GeneratedFile,
    ScaffoldReport,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaSpec {
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

fn getter_name(f: &Field) -> String {
    let prefix = if f.ty.trim() == "boolean" { "is" } else { "get" };
    format!("{prefix}{}", pascal_case(&f.name))
}

fn render(spec: &JavaSpec) -> String {
    let name = &spec.name;
    let mut out = format!("package {};\n\npublic class {name} {{\n", spec.package);

    if !spec.fields.is_empty() {
        out.push('\n');
        for f in &spec.fields {
            out.push_str(&format!("    private {} {};\n", f.ty.trim(), f.name));
        }
    }

    out.push_str(&format!("\n    public {name}() {{\n    }}\n"));

    if !spec.fields.is_empty() {
        let params: Vec<String> = spec
            .fields
            .iter()
            .map(|f| format!("{} {}", f.ty.trim(), f.name))
            .collect();
        out.push_str(&format!("\n    public {name}({}) {{\n", params.join(", ")));
        for f in &spec.fields {
            out.push_str(&format!("        this.{0} = {0};\n", f.name));
        }
        out.push_str("    }\n");
    }

    for f in &spec.fields {
        let ty = f.ty.trim();
        out.push_str(&format!(
            "\n    public {ty} {}() {{\n        return {};\n    }}\n",
            getter_name(f),
            f.name
        ));
        out.push_str(&format!(
            "\n    public void set{}({ty} {1}) {{\n        this.{1} = {1};\n    }}\n",
            pascal_case(&f.name),
            f.name
        ));
    }

    out.push_str("\n    @Override\n    public String toString() {\n");
    if spec.fields.is_empty() {
        out.push_str(&format!("        return \"{name}{{}}\";\n"));
    } else {
        out.push_str(&format!("        return \"{name}{{\" +\n"));
        for (i, f) in spec.fields.iter().enumerate() {
            let sep = if i == 0 { "" } else { ", " };
            out.push_str(&format!("                \"{sep}{0}=\" + {0} +\n", f.name));
        }
        out.push_str("                \"}\";\n");
    }
    out.push_str("    }\n}\n");
    out
}

/// Plain Java class with constructors, accessors and `toString`.
pub fn generate(spec: &JavaSpec) -> Result<ScaffoldReport> {
    require_identifier("class name", &spec.name)?;
    require_qualified("package", &spec.package)?;
    validate_fields(&spec.fields)?;

    let path = format!("{}/{}.java", spec.package.replace('.', "/"), spec.name);
    Ok(ScaffoldReport {
        generator: "java",
        files: vec![GeneratedFile::new(path, render(spec))],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> JavaSpec {
        JavaSpec {
            name: "Customer".into(),
            package: "com.example.model".into(),
            fields: vec![
                Field { name: "name".into(), ty: "String".into() },
                Field { name: "active".into(), ty: "boolean".into() },
            ],
        }
    }

    #[test]
    fn generates_pojo() {
        let report = generate(&spec()).unwrap();
        let file = &report.files[0];
        assert_eq!(file.path, "com/example/model/Customer.java");
        let src = &file.content;
        assert!(src.starts_with("package com.example.model;\n\npublic class Customer {\n"));
        assert!(src.contains("    private String name;\n    private boolean active;\n"));
        assert!(src.contains("    public Customer() {\n    }\n"));
        assert!(src.contains(
            "    public Customer(String name, boolean active) {\n        this.name = name;\n"
        ));
        assert!(src.contains("    public String getName() {\n        return name;\n    }\n"));
        assert!(src.contains("    public boolean isActive() {\n"));
        assert!(src.contains(
            "    public void setActive(boolean active) {\n        this.active = active;\n"
        ));
        assert!(src.contains(concat!(
            "        return \"Customer{\" +\n",
            "                \"name=\" + name +\n",
            "                \", active=\" + active +\n",
            "                \"}\";\n",
        )));
        assert!(src.ends_with("    }\n}\n"));
    }

    #[test]
    fn no_fields_skips_all_args_constructor() {
        let mut s = spec();
        s.fields.clear();
        let src = generate(&s).unwrap().files.remove(0).content;
        assert_eq!(src.matches("public Customer(").count(), 1);
        assert!(src.contains("return \"Customer{}\";"));
    }

    #[test]
    fn rejects_bad_identifiers() {
        let mut s = spec();
        s.name = "Customer Record".into();
        assert!(generate(&s).is_err());
        let mut s = spec();
        s.package = "com.2example".into();
        assert!(generate(&s).is_err());
    }
}
