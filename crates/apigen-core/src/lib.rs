pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod profile;
pub mod transform;

pub use transform::generate;

/// A rendered file with path (relative to the output root) and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

/// Turns a finished intermediate model into source files for one target.
///
/// Renderers receive the model read-only; everything they need (type names,
/// literals, imports, variants) is already resolved.
pub trait TemplateRenderer {
    type Error: std::error::Error;
    fn render(&self, model: &ir::IntermediateModel) -> Result<Vec<RenderedFile>, Self::Error>;
}

/// The packaged copy of the contract, placed at `specFileLocation`.
/// `None` when the copy is disabled.
pub fn embedded_contract(model: &ir::IntermediateModel, source: &str) -> Option<RenderedFile> {
    model
        .flags
        .spec_file_location
        .as_ref()
        .map(|path| RenderedFile {
            path: path.clone(),
            content: source.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureFlags, FlagSettings};
    use crate::profile::TargetProfile;

    const PING: &str = r##"
openapi: 3.0.3
info:
  title: Ping
  version: "1"
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pong"
components:
  schemas:
    Pong:
      type: object
      required: [at]
      properties:
        at:
          type: string
          format: date-time
"##;

    /// One line per model and one per operation signature.
    struct OutlineRenderer;

    impl TemplateRenderer for OutlineRenderer {
        type Error = std::convert::Infallible;

        fn render(&self, model: &ir::IntermediateModel) -> Result<Vec<RenderedFile>, Self::Error> {
            let mut files: Vec<RenderedFile> = model
                .models
                .iter()
                .map(|m| RenderedFile {
                    path: format!("model/{}.txt", m.name.pascal_case),
                    content: m
                        .fields
                        .iter()
                        .map(|f| format!("{} {}", f.field_type.name, f.identifier))
                        .collect::<Vec<_>>()
                        .join("\n"),
                })
                .collect();
            for group in &model.groups {
                let content = group
                    .operations
                    .iter()
                    .map(|op| format!("{} {}()", op.variant.return_type.name, op.name.camel_case))
                    .collect::<Vec<_>>()
                    .join("\n");
                files.push(RenderedFile {
                    path: format!("api/{}.txt", group.api_name),
                    content,
                });
            }
            Ok(files)
        }
    }

    fn build(settings: FlagSettings) -> ir::IntermediateModel {
        let spec = parse::from_yaml(PING).unwrap();
        let profile = TargetProfile::builtin("jaxrs_spec").unwrap().unwrap();
        let flags = FeatureFlags::resolve(&settings, &FlagSettings::default(), "openapi.yaml")
            .unwrap();
        generate(&spec, &profile, &flags).unwrap()
    }

    #[test]
    fn renderer_consumes_resolved_model() {
        let model = build(FlagSettings {
            interface_only: Some(true),
            support_async: Some(true),
            ..Default::default()
        });
        let files = OutlineRenderer.render(&model).unwrap();
        assert_eq!(
            files,
            vec![
                RenderedFile {
                    path: "model/Pong.txt".to_string(),
                    content: "OffsetDateTime at".to_string(),
                },
                RenderedFile {
                    path: "api/PingApi.txt".to_string(),
                    content: "CompletionStage<Pong> ping()".to_string(),
                },
            ]
        );
    }

    #[test]
    fn contract_copy_follows_spec_file_location() {
        let model = build(FlagSettings::default());
        let copy = embedded_contract(&model, PING).unwrap();
        assert_eq!(copy.path, "openapi.yaml");
        assert_eq!(copy.content, PING);

        let disabled = build(FlagSettings {
            spec_file_location: Some(String::new()),
            ..Default::default()
        });
        assert!(embedded_contract(&disabled, PING).is_none());
    }
}
