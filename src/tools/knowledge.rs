use std::sync::Arc;

use serde_json::{json, Value};

use super::ToolDefinition;
use crate::core::config::{AppPaths, KnowledgeConfig};
use crate::core::errors::KnowledgeError;
use crate::embedding::{EmbeddingService, OpenAiEmbeddingService};
use crate::object::{ObjectId, SqliteKnowledgeStore};
use crate::retrieval::{parse_offset, ContextFormatter, Modality, QueryRouter, Reconstructor};
use crate::vector::{VectorCollections, VectorIndexFactory};

pub const QUERY_KNOWLEDGE: &str = "query_knowledge";

/// The `query_knowledge` function exposed to the agent host.
pub struct KnowledgeTool {
    router: QueryRouter,
    formatter: ContextFormatter,
    top_k: usize,
}

impl KnowledgeTool {
    pub fn new(router: QueryRouter, formatter: ContextFormatter, top_k: usize) -> Self {
        Self {
            router,
            formatter,
            top_k,
        }
    }

    /// Wires the local SQLite stores and the HTTP embedding client.
    pub async fn open(paths: &AppPaths, config: &KnowledgeConfig) -> Result<Self, KnowledgeError> {
        let embedder: Arc<dyn EmbeddingService> =
            Arc::new(OpenAiEmbeddingService::new(&config.embedding)?);
        let collections: Arc<dyn VectorIndexFactory> = Arc::new(VectorCollections::new(paths));
        let store = Arc::new(SqliteKnowledgeStore::new(paths).await?);

        let router = QueryRouter::new(embedder, collections, config);
        let reconstructor = Arc::new(Reconstructor::new(store.clone(), store));
        Ok(Self::new(
            router,
            ContextFormatter::new(reconstructor),
            config.top_k,
        ))
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: QUERY_KNOWLEDGE.to_string(),
            description: "vector query content from local knowledge base".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "tokens": {
                        "type": "string",
                        "description": "key words to query"
                    },
                    "types": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["text", "image"] },
                        "default": ["text"],
                        "description": "prefered knowledge types, one or more of [text, image]"
                    },
                    "limit": {
                        "type": "string",
                        "default": "0",
                        "description": "index of query result"
                    }
                },
                "required": ["tokens"]
            }),
        }
    }

    pub async fn query(
        &self,
        tokens: &str,
        modalities: &[Modality],
        offset: usize,
    ) -> Result<String, KnowledgeError> {
        let object_ids = self
            .router
            .query_objects(tokens, modalities, self.top_k)
            .await?;
        self.formatter.format(&object_ids, offset).await
    }

    pub async fn call(&self, args: &Value) -> Result<String, KnowledgeError> {
        let tokens = args
            .get("tokens")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        if tokens.is_empty() {
            return Err(KnowledgeError::BadArguments("tokens missing".to_string()));
        }

        let modalities = parse_types(args.get("types"))?;
        let offset = match args.get("limit") {
            None | Some(Value::Null) => 0,
            Some(value) => parse_offset(value)?,
        };

        tracing::info!(
            "query_knowledge tokens={:?} types={:?} offset={}",
            tokens,
            modalities,
            offset
        );
        self.query(&tokens, &modalities, offset).await
    }

    /// Embeds `content` with the modality's model and stores it under `id`.
    pub async fn index(
        &self,
        id: &ObjectId,
        content: &str,
        modality: Modality,
    ) -> Result<(), KnowledgeError> {
        let model = self.router.model_for(modality);
        let vector = self.router.embedder().embed(content, model).await?;
        let collection = self.router.collections().collection(model).await?;
        collection.insert(&vector, id).await
    }
}

fn parse_types(value: Option<&Value>) -> Result<Vec<Modality>, KnowledgeError> {
    match value {
        None | Some(Value::Null) => Ok(vec![Modality::Text]),
        Some(Value::Array(items)) => Ok(Modality::parse_all(
            items.iter().filter_map(|item| item.as_str()),
        )),
        Some(Value::String(raw)) => Ok(Modality::parse_all(
            raw.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty()),
        )),
        Some(other) => Err(KnowledgeError::BadArguments(format!(
            "types must be a list of names, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::object::ObjectType;
    use crate::retrieval::{NO_MORE_INFORMATION, PROVIDED_PREAMBLE};

    /// Scores text on two topics so nearest-neighbour order is predictable.
    struct TopicEmbedder;

    #[async_trait]
    impl EmbeddingService for TopicEmbedder {
        async fn embed(&self, input: &str, _model: &str) -> Result<Vec<f32>, KnowledgeError> {
            let lower = input.to_lowercase();
            let budget = if lower.contains("budget") { 1.0 } else { 0.0 };
            let cat = if lower.contains("cat") { 1.0 } else { 0.0 };
            Ok(vec![budget, cat, 0.1])
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        tool: KnowledgeTool,
        store: Arc<SqliteKnowledgeStore>,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_root(dir.path());
        let config = KnowledgeConfig::default();

        let store = Arc::new(SqliteKnowledgeStore::new(&paths).await.unwrap());
        let router = QueryRouter::new(
            Arc::new(TopicEmbedder),
            Arc::new(VectorCollections::new(&paths)),
            &config,
        );
        let reconstructor = Arc::new(Reconstructor::new(store.clone(), store.clone()));
        let tool = KnowledgeTool::new(router, ContextFormatter::new(reconstructor), config.top_k);

        Fixture {
            _dir: dir,
            tool,
            store,
        }
    }

    async fn seed(f: &Fixture) -> (ObjectId, ObjectId, ObjectId) {
        let email = ObjectId::from_content(ObjectType::Email, b"budget-mail");
        let chunk = ObjectId::from_content(ObjectType::Chunk, b"budget-chunk");
        let image = ObjectId::from_content(ObjectType::Image, b"cat.png");

        f.store
            .put_object(&email, json!({ "subject": "Budget 2027" }).as_object().unwrap())
            .await
            .unwrap();
        f.store.put_relation(&chunk, &email).await.unwrap();
        f.store
            .put_chunk(&chunk, b"The budget was approved.")
            .await
            .unwrap();

        f.tool
            .index(&chunk, "The budget was approved.", Modality::Text)
            .await
            .unwrap();
        f.tool
            .index(&image, "a cat on a sofa", Modality::Image)
            .await
            .unwrap();

        (email, chunk, image)
    }

    #[test]
    fn definition_names_the_function_and_its_parameters() {
        let def = KnowledgeTool::definition();
        assert_eq!(def.name, "query_knowledge");
        let props = &def.parameters["properties"];
        assert!(props.get("tokens").is_some());
        assert_eq!(props["types"]["default"], json!(["text"]));
        assert_eq!(props["limit"]["default"], json!("0"));
    }

    #[test]
    fn types_accept_lists_strings_and_default_to_text() {
        assert_eq!(parse_types(None).unwrap(), vec![Modality::Text]);
        assert_eq!(
            parse_types(Some(&json!(["image", "text"]))).unwrap(),
            vec![Modality::Image, Modality::Text]
        );
        assert_eq!(
            parse_types(Some(&json!("text, image"))).unwrap(),
            vec![Modality::Text, Modality::Image]
        );
        assert!(parse_types(Some(&json!(["video"]))).unwrap().is_empty());
        assert!(parse_types(Some(&json!(3))).is_err());
    }

    #[tokio::test]
    async fn text_query_returns_the_email_with_its_chunk() {
        let f = fixture().await;
        seed(&f).await;

        let output = f
            .tool
            .call(&json!({ "tokens": "budget" }))
            .await
            .unwrap();

        assert!(output.starts_with(PROVIDED_PREAMBLE));
        let body = &output[PROVIDED_PREAMBLE.len()..output.len() - 2];
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed,
            json!([{
                "type": "email",
                "subject": "Budget 2027",
                "contents": [{ "type": "text", "content": "The budget was approved." }],
            }])
        );
    }

    #[tokio::test]
    async fn offsets_walk_through_text_then_image_matches() {
        let f = fixture().await;
        let (_, _, image) = seed(&f).await;
        let args = |limit: &str| json!({ "tokens": "cat", "types": ["image", "text"], "limit": limit });

        let second = f.tool.call(&args("1")).await.unwrap();
        assert!(second.contains(&image.to_string()));
        assert!(second.contains("\"type\":\"image\""));

        let third = f.tool.call(&args("2")).await.unwrap();
        assert_eq!(third, NO_MORE_INFORMATION);
    }

    #[tokio::test]
    async fn bad_arguments_are_rejected() {
        let f = fixture().await;

        let err = f.tool.call(&json!({ "types": ["text"] })).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::BadArguments(_)));

        let err = f
            .tool
            .call(&json!({ "tokens": "budget", "limit": "first" }))
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidOffset(_)));
    }

    #[tokio::test]
    async fn host_dispatch_routes_by_name() {
        let f = fixture().await;

        let output = crate::tools::execute_tool(&f.tool, QUERY_KNOWLEDGE, &json!({ "tokens": "budget" }))
            .await
            .unwrap();
        assert_eq!(output, NO_MORE_INFORMATION);

        let err = crate::tools::execute_tool(&f.tool, "web_search", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::BadArguments(_)));
    }

    #[tokio::test]
    async fn empty_index_reports_no_more_information() {
        let f = fixture().await;
        let output = f.tool.call(&json!({ "tokens": "budget" })).await.unwrap();
        assert_eq!(output, NO_MORE_INFORMATION);
    }
}
