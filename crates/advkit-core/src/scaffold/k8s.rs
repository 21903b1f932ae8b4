use super::{require_identifier, GeneratedFile, ScaffoldReport};
use crate::error::{AdvkitError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static DNS_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn dns_label_re() -> &'static Regex {
    DNS_LABEL_RE.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap())
}

const MAX_NAME_LEN: usize = 63;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sSpec {
    pub name: String,
    pub image: String,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    pub port: u16,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_replicas() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Manifest shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<S> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: S,
}

#[derive(Serialize)]
struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    labels: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct DeploymentSpec {
    replicas: u32,
    selector: Selector,
    template: PodTemplate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Selector {
    match_labels: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct PodTemplate {
    metadata: Metadata,
    spec: PodSpec,
}

#[derive(Serialize)]
struct PodSpec {
    containers: Vec<Container>,
}

#[derive(Serialize)]
struct Container {
    name: String,
    image: String,
    ports: Vec<ContainerPort>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<EnvVar>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerPort {
    container_port: u16,
}

#[derive(Serialize)]
struct EnvVar {
    name: String,
    value: String,
}

#[derive(Serialize)]
struct ServiceSpec {
    #[serde(rename = "type")]
    service_type: &'static str,
    selector: BTreeMap<String, String>,
    ports: Vec<ServicePort>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServicePort {
    port: u16,
    target_port: u16,
}

fn validate(spec: &K8sSpec) -> Result<()> {
    if spec.name.len() > MAX_NAME_LEN || !dns_label_re().is_match(&spec.name) {
        return Err(AdvkitError::invalid(
            &spec.name,
            "name must be a lowercase DNS label ([a-z0-9-], at most 63 characters)",
        ));
    }
    if spec.image.trim().is_empty() || spec.image.contains(char::is_whitespace) {
        return Err(AdvkitError::invalid(&spec.name, "image must be a non-empty image reference"));
    }
    if spec.port == 0 {
        return Err(AdvkitError::invalid(&spec.name, "port must be between 1 and 65535"));
    }
    if spec.replicas == 0 {
        tracing::warn!(name = %spec.name, "deployment scaled to zero replicas");
    }
    for key in spec.env.keys() {
        require_identifier("environment variable", key)?;
    }
    Ok(())
}

/// Deployment and ClusterIP Service as one multi-document YAML file.
pub fn generate(spec: &K8sSpec) -> Result<ScaffoldReport> {
    validate(spec)?;
    let labels: BTreeMap<String, String> = [("app".to_string(), spec.name.clone())].into();

    let deployment = Manifest {
        api_version: "apps/v1",
        kind: "Deployment",
        metadata: Metadata {
            name: Some(spec.name.clone()),
            labels: labels.clone(),
        },
        spec: DeploymentSpec {
            replicas: spec.replicas,
            selector: Selector {
                match_labels: labels.clone(),
            },
            template: PodTemplate {
                metadata: Metadata {
                    name: None,
                    labels: labels.clone(),
                },
                spec: PodSpec {
                    containers: vec![Container {
                        name: spec.name.clone(),
                        image: spec.image.trim().to_string(),
                        ports: vec![ContainerPort {
                            container_port: spec.port,
                        }],
                        env: spec
                            .env
                            .iter()
                            .map(|(name, value)| EnvVar {
                                name: name.clone(),
                                value: value.clone(),
                            })
                            .collect(),
                    }],
                },
            },
        },
    };

    let service = Manifest {
        api_version: "v1",
        kind: "Service",
        metadata: Metadata {
            name: Some(spec.name.clone()),
            labels: labels.clone(),
        },
        spec: ServiceSpec {
            service_type: "ClusterIP",
            selector: labels,
            ports: vec![ServicePort {
                port: spec.port,
                target_port: spec.port,
            }],
        },
    };

    let content = format!(
        "{}---\n{}",
        serde_yaml::to_string(&deployment)?,
        serde_yaml::to_string(&service)?
    );
    Ok(ScaffoldReport {
        generator: "k8s",
        files: vec![GeneratedFile::new(format!("{}.yaml", spec.name), content)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> K8sSpec {
        serde_yaml::from_str(
            "name: billing-api\nimage: registry.local/billing:1.4.2\nreplicas: 3\nport: 8080\nenv:\n  RUST_LOG: info\n  DB_HOST: db\n",
        )
        .unwrap()
    }

    fn documents(content: &str) -> Vec<serde_yaml::Value> {
        serde_yaml::Deserializer::from_str(content)
            .map(|doc| serde_yaml::Value::deserialize(doc).unwrap())
            .collect()
    }

    #[test]
    fn deployment_and_service() {
        let report = generate(&spec()).unwrap();
        assert_eq!(report.files[0].path, "billing-api.yaml");
        let docs = documents(&report.files[0].content);
        assert_eq!(docs.len(), 2);

        let dep = &docs[0];
        assert_eq!(dep["apiVersion"].as_str(), Some("apps/v1"));
        assert_eq!(dep["kind"].as_str(), Some("Deployment"));
        assert_eq!(dep["spec"]["replicas"].as_u64(), Some(3));
        assert_eq!(
            dep["spec"]["selector"]["matchLabels"]["app"].as_str(),
            Some("billing-api")
        );
        let container = &dep["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["ports"][0]["containerPort"].as_u64(), Some(8080));
        // env is sorted by key
        assert_eq!(container["env"][0]["name"].as_str(), Some("DB_HOST"));

        let svc = &docs[1];
        assert_eq!(svc["kind"].as_str(), Some("Service"));
        assert_eq!(svc["spec"]["type"].as_str(), Some("ClusterIP"));
        assert_eq!(svc["spec"]["ports"][0]["targetPort"].as_u64(), Some(8080));
    }

    #[test]
    fn replicas_default_to_one() {
        let s: K8sSpec = serde_yaml::from_str("name: web\nimage: nginx\nport: 80\n").unwrap();
        assert_eq!(s.replicas, 1);
        let docs = documents(&generate(&s).unwrap().files[0].content);
        assert!(docs[0]["spec"]["template"]["spec"]["containers"][0]["env"].is_null());
    }

    #[test]
    fn invalid_names_rejected() {
        for name in ["Billing", "-api", "api-", "has_underscore"] {
            let mut s = spec();
            s.name = name.into();
            assert!(generate(&s).is_err(), "{name} should be rejected");
        }
        let mut s = spec();
        s.name = "a".repeat(64);
        assert!(generate(&s).is_err());
        let mut s = spec();
        s.port = 0;
        assert!(generate(&s).is_err());
    }
}
