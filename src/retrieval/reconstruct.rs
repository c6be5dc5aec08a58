//! Maps matched fragments back to the documents they came from.
//!
//! Matches are grouped under their relation-forest root. Email roots become a
//! container whose `contents` hold the matched fragments; every other root
//! contributes its members directly to the output.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::core::errors::KnowledgeError;
use crate::object::{ObjectId, ObjectStore, ObjectType, RelationStore};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedDescription {
    Email {
        desc: Map<String, Value>,
        contents: Vec<RenderedDescription>,
    },
    Text {
        content: String,
    },
    Image {
        id: ObjectId,
    },
    Video {
        desc: Map<String, Value>,
    },
}

impl RenderedDescription {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderedDescription::Email { .. } => "email",
            RenderedDescription::Text { .. } => "text",
            RenderedDescription::Image { .. } => "image",
            RenderedDescription::Video { .. } => "video",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = match self {
            RenderedDescription::Email { desc, contents } => {
                let mut map = desc.clone();
                map.insert(
                    "contents".to_string(),
                    Value::Array(contents.iter().map(Self::to_json).collect()),
                );
                map
            }
            RenderedDescription::Text { content } => {
                let mut map = Map::new();
                map.insert("content".to_string(), Value::String(content.clone()));
                map
            }
            RenderedDescription::Image { id } => {
                let mut map = Map::new();
                map.insert("id".to_string(), Value::String(id.to_string()));
                map
            }
            RenderedDescription::Video { desc } => desc.clone(),
        };
        map.insert("type".to_string(), Value::String(self.kind().to_string()));
        Value::Object(map)
    }
}

impl Serialize for RenderedDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Matched ids sharing one root; the root is always the first member.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedGroup {
    pub root: ObjectId,
    pub members: Vec<ObjectId>,
}

pub struct Reconstructor {
    relations: Arc<dyn RelationStore>,
    objects: Arc<dyn ObjectStore>,
}

impl Reconstructor {
    pub fn new(relations: Arc<dyn RelationStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { relations, objects }
    }

    pub async fn group_by_root(
        &self,
        object_ids: &[ObjectId],
    ) -> Result<Vec<ReconstructedGroup>, KnowledgeError> {
        let mut groups: Vec<ReconstructedGroup> = Vec::new();
        let mut group_index: HashMap<ObjectId, usize> = HashMap::new();
        let mut placed: HashSet<ObjectId> = HashSet::new();

        for object_id in object_ids {
            let parents = self.relations.related_root_objects(object_id).await?;
            let root = parents.first().copied().unwrap_or(*object_id);
            tracing::info!("object_id: {} root_object_id: {}", object_id, root);

            let idx = match group_index.get(&root) {
                Some(idx) => *idx,
                None => {
                    groups.push(ReconstructedGroup {
                        root,
                        members: vec![root],
                    });
                    placed.insert(root);
                    group_index.insert(root, groups.len() - 1);
                    groups.len() - 1
                }
            };

            if placed.insert(*object_id) {
                groups[idx].members.push(*object_id);
            }
        }

        Ok(groups)
    }

    pub async fn reconstruct(
        &self,
        object_ids: &[ObjectId],
    ) -> Result<Vec<RenderedDescription>, KnowledgeError> {
        let groups = self.group_by_root(object_ids).await?;
        let mut output = Vec::new();

        for group in groups {
            match group.root.object_type() {
                ObjectType::Email => {
                    let email = self.objects.load_object(&group.root).await?;
                    let mut contents = Vec::new();
                    for member in &group.members[1..] {
                        if let Some(rendered) = self.render_member(member).await? {
                            contents.push(rendered);
                        }
                    }
                    output.push(RenderedDescription::Email {
                        desc: email.get_desc(),
                        contents,
                    });
                }
                _ => {
                    for member in &group.members {
                        if let Some(rendered) = self.render_member(member).await? {
                            output.push(rendered);
                        }
                    }
                }
            }
        }

        Ok(output)
    }

    async fn render_member(
        &self,
        object_id: &ObjectId,
    ) -> Result<Option<RenderedDescription>, KnowledgeError> {
        let rendered = match object_id.object_type() {
            ObjectType::Chunk => {
                let bytes = self.objects.chunk_reader().get_chunk(object_id).await?;
                let content = String::from_utf8(bytes).map_err(|err| {
                    KnowledgeError::Resolution(format!("chunk {} is not utf-8: {}", object_id, err))
                })?;
                RenderedDescription::Text { content }
            }
            ObjectType::Image => RenderedDescription::Image { id: *object_id },
            ObjectType::Video => {
                let video = self.objects.load_object(object_id).await?;
                RenderedDescription::Video {
                    desc: video.get_desc(),
                }
            }
            other => {
                tracing::debug!("skipping {} of type {:?}", object_id, other);
                return Ok(None);
            }
        };

        Ok(Some(rendered))
    }
}
