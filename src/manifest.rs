//! # Manifest Module
//!
//! YAML description of controllers, for routes declared without code.
//! Every handler is bound through a factory, the CLI uses
//! [`echo_handler`](crate::echo::echo_handler).
//!
//! ```yaml
//! controllers:
//!   - name: users
//!     mappings:
//!       - paths: [/users]
//!     handlers:
//!       - name: current_user
//!         produces: [user]
//!         params:
//!           - kind: header
//!             name: x-user
//!             default: anonymous
//!       - name: get
//!         mappings:
//!           - methods: [GET]
//!             paths: ["/{id}"]
//!         params:
//!           - kind: path_variable
//!             name: id
//!           - kind: model_attribute
//!             name: user
//! ```

use crate::controller::{
    parse_method, ControllerDescriptor, HandlerDescriptor, HandlerFn, ParameterSpec,
    RequestMapping,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub controllers: Vec<ManifestController>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestController {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<ManifestMapping>,
    pub handlers: Vec<ManifestHandler>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestMapping {
    /// Empty accepts any method
    #[serde(default)]
    pub methods: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestHandler {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<ManifestMapping>,
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub body_required: bool,
}

impl ManifestMapping {
    fn to_mapping(&self) -> Result<RequestMapping> {
        let methods = self
            .methods
            .iter()
            .map(|m| parse_method(m).with_context(|| format!("Invalid HTTP method '{m}'")))
            .collect::<Result<Vec<_>>>()?;
        Ok(RequestMapping::new(methods, self.paths.clone()))
    }
}

impl Manifest {
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown fields.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse controller manifest")
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        info!(
            manifest = %path.display(),
            controllers = manifest.controllers.len(),
            "Controller manifest loaded"
        );
        Ok(manifest)
    }

    /// Build descriptors, binding each handler through `factory(controller, handler)`
    ///
    /// # Errors
    ///
    /// Fails on invalid method names or controllers that do not validate.
    pub fn into_descriptors<F>(self, factory: F) -> Result<Vec<ControllerDescriptor>>
    where
        F: Fn(&str, &str) -> HandlerFn,
    {
        self.controllers
            .into_iter()
            .map(|controller| -> Result<ControllerDescriptor> {
                let mut builder = ControllerDescriptor::builder(&controller.name);
                for mapping in &controller.mappings {
                    builder = builder.root(mapping.to_mapping().with_context(|| {
                        format!("Controller '{}' root mapping", controller.name)
                    })?);
                }
                for handler in controller.handlers {
                    let mut descriptor =
                        HandlerDescriptor::new(factory(&controller.name, &handler.name))
                            .params(handler.params);
                    for mapping in &handler.mappings {
                        descriptor = descriptor.mapping(mapping.to_mapping().with_context(|| {
                            format!("Handler '{}.{}' mapping", controller.name, handler.name)
                        })?);
                    }
                    for attribute in &handler.produces {
                        descriptor = descriptor.produces(attribute);
                    }
                    if handler.body_required {
                        descriptor = descriptor.body_required();
                    }
                    builder = builder.handler(&handler.name, descriptor);
                }
                Ok(builder.build()?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo::echo_handler;
    use http::Method;

    const MANIFEST: &str = r#"
controllers:
  - name: items
    mappings:
      - methods: [get, POST]
        paths: [/items]
    handlers:
      - name: list
        mappings:
          - paths: ["/"]
        params:
          - kind: query_param
            name: limit
            value_type: integer
      - name: create
        mappings:
          - methods: [POST]
            paths: ["/"]
        params:
          - kind: request_body
        body_required: true
"#;

    #[test]
    fn test_manifest_to_descriptors() {
        let descriptors = Manifest::from_yaml(MANIFEST)
            .unwrap()
            .into_descriptors(echo_handler)
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        let items = &descriptors[0];
        assert_eq!(items.mappings[0].methods, vec![Method::GET, Method::POST]);
        let create = items.handler("create").unwrap();
        assert!(create.body_required);
        assert_eq!(create.params, vec![ParameterSpec::RequestBody]);
    }

    #[test]
    fn test_manifest_rejects_unknown_fields() {
        let err = Manifest::from_yaml("controllers: []\nextra: 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("extra"));
    }

    #[test]
    fn test_manifest_rejects_bad_method() {
        let yaml = r#"
controllers:
  - name: bad
    handlers:
      - name: h
        mappings:
          - methods: [BREW]
            paths: [/x]
"#;
        let err = Manifest::from_yaml(yaml)
            .unwrap()
            .into_descriptors(echo_handler)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Invalid HTTP method"));
    }

    #[test]
    fn test_manifest_rejects_duplicate_handlers() {
        let yaml = r#"
controllers:
  - name: dup
    handlers:
      - name: h
      - name: h
"#;
        let err = Manifest::from_yaml(yaml)
            .unwrap()
            .into_descriptors(echo_handler)
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
