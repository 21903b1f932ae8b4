use super::{
    camel_case, pascal_case, require_identifier, require_qualified, validate_fields, Field,
    GeneratedFile, ScaffoldReport,
};
use crate::error::{AdvkitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsharpSpec {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

fn render(spec: &CsharpSpec) -> String {
    let name = &spec.name;
    let mut out = format!(
        "namespace {}\n{{\n    public class {name}\n    {{\n",
        spec.namespace
    );
    for f in &spec.fields {
        out.push_str(&format!(
            "        public {} {} {{ get; set; }}\n",
            f.ty.trim(),
            pascal_case(&f.name)
        ));
    }
    if !spec.fields.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("        public {name}()\n        {{\n        }}\n"));

    if !spec.fields.is_empty() {
        let params: Vec<String> = spec
            .fields
            .iter()
            .map(|f| format!("{} {}", f.ty.trim(), camel_case(&f.name)))
            .collect();
        out.push_str(&format!(
            "\n        public {name}({})\n        {{\n",
            params.join(", ")
        ));
        for f in &spec.fields {
            out.push_str(&format!(
                "            {} = {};\n",
                pascal_case(&f.name),
                camel_case(&f.name)
            ));
        }
        out.push_str("        }\n");
    }
    out.push_str("    }\n}\n");
    out
}

/// C# class with PascalCase auto-properties and a full constructor.
pub fn generate(spec: &CsharpSpec) -> Result<ScaffoldReport> {
    require_identifier("class name", &spec.name)?;
    require_qualified("namespace", &spec.namespace)?;
    validate_fields(&spec.fields)?;

    let mut props = HashSet::new();
    for f in &spec.fields {
        let prop = pascal_case(&f.name);
        if prop == spec.name {
            return Err(AdvkitError::invalid(
                &f.name,
                "property name would equal the class name",
            ));
        }
        if !props.insert(prop) {
            return Err(AdvkitError::invalid(&f.name, "duplicate property name"));
        }
    }

    Ok(ScaffoldReport {
        generator: "csharp",
        files: vec![GeneratedFile::new(format!("{}.cs", spec.name), render(spec))],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CsharpSpec {
        CsharpSpec {
            name: "Order".into(),
            namespace: "Acme.Sales".into(),
            fields: vec![
                Field { name: "order_id".into(), ty: "int".into() },
                Field { name: "customer".into(), ty: "string".into() },
            ],
        }
    }

    #[test]
    fn generates_class() {
        let report = generate(&spec()).unwrap();
        assert_eq!(report.files[0].path, "Order.cs");
        let expected = "namespace Acme.Sales
{
    public class Order
    {
        public int OrderId { get; set; }
        public string Customer { get; set; }

        public Order()
        {
        }

        public Order(int orderId, string customer)
        {
            OrderId = orderId;
            Customer = customer;
        }
    }
}
";
        assert_eq!(report.files[0].content, expected);
    }

    #[test]
    fn colliding_property_names_rejected() {
        let mut s = spec();
        s.fields = vec![
            Field { name: "first_name".into(), ty: "string".into() },
            Field { name: "firstName".into(), ty: "string".into() },
        ];
        assert!(generate(&s).is_err());
        let mut s = spec();
        s.fields = vec![Field { name: "order".into(), ty: "int".into() }];
        assert!(generate(&s).is_err());
    }
}
