use super::{require_identifier, GeneratedFile, ScaffoldReport};
use crate::error::{AdvkitError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_type() -> String {
    "string".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    /// Raw HCL expression, e.g. `aws_s3_bucket.this.arn`.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerraformSpec {
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

/// Quoted HCL string; `${` is escaped so values are never interpolated.
fn hcl_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace("${", "$${");
    format!("\"{escaped}\"")
}

fn hcl_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => hcl_string(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(hcl_value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{} = {}", hcl_string(k), hcl_value(v)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

fn main_tf(spec: &TerraformSpec, has_region: bool) -> String {
    let provider = &spec.provider;
    let mut out = format!(
        "terraform {{\n  required_providers {{\n    {provider} = {{\n      source = \"hashicorp/{provider}\"\n    }}\n  }}\n}}\n\n"
    );
    out.push_str(&format!("provider \"{provider}\" {{\n"));
    if provider == "azurerm" {
        out.push_str("  features {}\n");
    } else if has_region {
        out.push_str("  region = var.region\n");
    }
    out.push_str("}\n\n");
    out.push_str(&format!(
        "locals {{\n  name = {}\n}}\n",
        hcl_string(&spec.name)
    ));
    out
}

fn variables_tf(spec: &TerraformSpec, has_region: bool) -> String {
    let mut blocks = Vec::new();
    if has_region {
        let region = spec.region.as_deref().unwrap_or_default();
        blocks.push(format!(
            "variable \"region\" {{\n  description = \"Deployment region\"\n  type        = string\n  default     = {}\n}}\n",
            hcl_string(region)
        ));
    }
    for v in &spec.variables {
        let mut b = format!("variable \"{}\" {{\n", v.name);
        if let Some(d) = &v.description {
            b.push_str(&format!("  description = {}\n", hcl_string(d)));
        }
        b.push_str(&format!("  type        = {}\n", v.ty.trim()));
        if let Some(d) = &v.default {
            b.push_str(&format!("  default     = {}\n", hcl_value(d)));
        }
        b.push_str("}\n");
        blocks.push(b);
    }
    blocks.join("\n")
}

fn outputs_tf(spec: &TerraformSpec) -> String {
    spec.outputs
        .iter()
        .map(|o| {
            let mut b = format!("output \"{}\" {{\n  value = {}\n", o.name, o.value.trim());
            if let Some(d) = &o.description {
                b.push_str(&format!("  description = {}\n", hcl_string(d)));
            }
            b.push_str("}\n");
            b
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate(spec: &TerraformSpec) -> Result<()> {
    require_identifier("module name", &spec.name)?;
    require_identifier("provider", &spec.provider)?;
    let mut names = HashSet::new();
    if spec.region.is_some() {
        names.insert("region".to_string());
    }
    for v in &spec.variables {
        require_identifier("variable name", &v.name)?;
        if v.ty.trim().is_empty() || v.ty.contains('\n') {
            return Err(AdvkitError::invalid(
                &v.name,
                "variable type must be a single-line expression",
            ));
        }
        if !names.insert(v.name.clone()) {
            return Err(AdvkitError::invalid(&v.name, "duplicate variable name"));
        }
    }
    let mut outputs = HashSet::new();
    for o in &spec.outputs {
        require_identifier("output name", &o.name)?;
        if o.value.trim().is_empty() || o.value.contains('\n') {
            return Err(AdvkitError::invalid(
                &o.name,
                "output value must be a single-line expression",
            ));
        }
        if !outputs.insert(o.name.as_str()) {
            return Err(AdvkitError::invalid(&o.name, "duplicate output name"));
        }
    }
    Ok(())
}

/// Terraform module skeleton: `main.tf`, `variables.tf`, `outputs.tf`.
pub fn generate(spec: &TerraformSpec) -> Result<ScaffoldReport> {
    validate(spec)?;
    let has_region = spec.region.is_some();
    let dir = &spec.name;
    Ok(ScaffoldReport {
        generator: "terraform",
        files: vec![
            GeneratedFile::new(format!("{dir}/main.tf"), main_tf(spec, has_region)),
            GeneratedFile::new(format!("{dir}/variables.tf"), variables_tf(spec, has_region)),
            GeneratedFile::new(format!("{dir}/outputs.tf"), outputs_tf(spec)),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TerraformSpec {
        serde_json::from_str(
            r#"{
                "name": "storage",
                "provider": "aws",
                "region": "eu-west-1",
                "variables": [
                    {"name": "bucket_name", "type": "string", "description": "Bucket name"},
                    {"name": "versioning", "type": "bool", "default": true},
                    {"name": "tags", "type": "map(string)", "default": {"team": "data"}}
                ],
                "outputs": [
                    {"name": "bucket_arn", "value": "aws_s3_bucket.this.arn", "description": "ARN"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn generates_three_files() {
        let report = generate(&spec()).unwrap();
        let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["storage/main.tf", "storage/variables.tf", "storage/outputs.tf"]
        );
        let main = &report.files[0].content;
        assert!(main.contains("    aws = {\n      source = \"hashicorp/aws\"\n"));
        assert!(main.contains("provider \"aws\" {\n  region = var.region\n}\n"));

        let vars = &report.files[1].content;
        assert!(vars.starts_with("variable \"region\" {"));
        assert!(vars.contains("  default     = \"eu-west-1\"\n"));
        assert!(vars.contains(concat!(
            "variable \"bucket_name\" {\n",
            "  description = \"Bucket name\"\n",
            "  type        = string\n",
            "}\n",
        )));
        assert!(vars.contains("  default     = true\n"));
        assert!(vars.contains("  default     = { \"team\" = \"data\" }\n"));

        let outputs = &report.files[2].content;
        assert_eq!(
            outputs,
            concat!(
                "output \"bucket_arn\" {\n",
                "  value = aws_s3_bucket.this.arn\n",
                "  description = \"ARN\"\n",
                "}\n",
            )
        );
    }

    #[test]
    fn azurerm_gets_features_block() {
        let mut s = spec();
        s.provider = "azurerm".into();
        let main = generate(&s).unwrap().files.remove(0).content;
        assert!(main.contains("provider \"azurerm\" {\n  features {}\n}"));
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(hcl_string("a\"b${x}"), "\"a\\\"b$${x}\"");
        assert_eq!(hcl_value(&serde_json::json!([1, "x"])), "[1, \"x\"]");
    }

    #[test]
    fn region_variable_collision_rejected() {
        let mut s = spec();
        s.variables.push(Variable {
            name: "region".into(),
            ty: "string".into(),
            default: None,
            description: None,
        });
        assert!(generate(&s).is_err());
    }
}
