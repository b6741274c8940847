use std::borrow::Cow;
use std::fs;
use std::path::Path;
use log::{debug, info};
use crate::errors::WikiError;
use crate::types::Page;
use crate::utils::escape_html;

/// The fixed set of templates the wiki renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    View,
    Edit,
    Top,
}

impl TemplateName {
    pub const ALL: [TemplateName; 3] = [TemplateName::View, TemplateName::Edit, TemplateName::Top];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::View => "view",
            TemplateName::Edit => "edit",
            TemplateName::Top => "top",
        }
    }
}

/// Placeholders a template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Body,
    /// One title while repeating over `PAGES`
    Page,
    Pages,
}

impl Field {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "TITLE" => Some(Field::Title),
            "BODY" => Some(Field::Body),
            "PAGE" => Some(Field::Page),
            "PAGES" => Some(Field::Pages),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Field::Title => "TITLE",
            Field::Body => "BODY",
            Field::Page => "PAGE",
            Field::Pages => "PAGES",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Value(Field),
    Each { field: Field, body: Vec<Node> },
}

/// Data a template is rendered against
#[derive(Clone, Copy)]
enum Scope<'a> {
    Page(&'a Page),
    Listing(&'a [String]),
    Item(&'a str),
}

/// A compiled template.
///
/// Syntax is `{{TITLE}}`, `{{BODY}}` and a repeat block
/// `{{#PAGES}}...{{PAGE}}...{{/PAGES}}`. Values are HTML-escaped on output.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile `source`, rejecting unknown tags and unbalanced blocks
    pub fn parse(name: &str, source: &str) -> Result<Self, WikiError> {
        let fail = |reason: String| WikiError::TemplateParse { name: name.to_string(), reason };

        // Each open block keeps its field and the nodes collected so far
        let mut stack: Vec<(Option<Field>, Vec<Node>)> = vec![(None, Vec::new())];
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            let nodes = &mut stack.last_mut().ok_or_else(|| fail("empty block stack".into()))?.1;
            if start > 0 {
                nodes.push(Node::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| fail(format!("unterminated tag at byte {}", offset + start)))?;
            let tag = after_open[..end].trim();

            if let Some(block) = tag.strip_prefix('#') {
                let field = Field::parse(block.trim())
                    .ok_or_else(|| fail(format!("unknown block '{}'", block.trim())))?;
                if field != Field::Pages {
                    return Err(fail(format!("'{}' cannot open a block", field.as_str())));
                }
                stack.push((Some(field), Vec::new()));
            } else if let Some(block) = tag.strip_prefix('/') {
                let field = Field::parse(block.trim())
                    .ok_or_else(|| fail(format!("unknown block '{}'", block.trim())))?;
                match stack.pop() {
                    Some((Some(open), body)) if open == field => {
                        let parent = &mut stack
                            .last_mut()
                            .ok_or_else(|| fail("empty block stack".into()))?
                            .1;
                        parent.push(Node::Each { field, body });
                    }
                    Some((Some(open), _)) => {
                        return Err(fail(format!(
                            "'{{{{/{}}}}}' closes '{{{{#{}}}}}'",
                            field.as_str(),
                            open.as_str()
                        )));
                    }
                    _ => {
                        return Err(fail(format!(
                            "'{{{{/{}}}}}' has no open block",
                            field.as_str()
                        )));
                    }
                }
            } else {
                let field =
                    Field::parse(tag).ok_or_else(|| fail(format!("unknown tag '{}'", tag)))?;
                if field == Field::Pages {
                    return Err(fail("'PAGES' can only be used as a block".into()));
                }
                nodes.push(Node::Value(field));
            }

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if stack.len() > 1 {
            return Err(fail("unclosed block".into()));
        }
        let (_, mut nodes) = stack.pop().ok_or_else(|| fail("empty block stack".into()))?;
        if !rest.is_empty() {
            nodes.push(Node::Text(rest.to_string()));
        }

        Ok(Self { name: name.to_string(), nodes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against a single page, appending to `out`
    pub fn render_page(&self, page: &Page, out: &mut String) -> Result<(), WikiError> {
        self.render_nodes(&self.nodes, Scope::Page(page), out)
    }

    /// Render against a list of page titles, appending to `out`
    pub fn render_listing(&self, titles: &[String], out: &mut String) -> Result<(), WikiError> {
        self.render_nodes(&self.nodes, Scope::Listing(titles), out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        scope: Scope<'_>,
        out: &mut String,
    ) -> Result<(), WikiError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Value(field) => out.push_str(&escape_html(&self.lookup(*field, scope)?)),
                Node::Each { field, body } => {
                    let Scope::Listing(titles) = scope else {
                        return Err(self.unavailable(*field));
                    };
                    for title in titles {
                        self.render_nodes(body, Scope::Item(title), out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn lookup<'s>(&self, field: Field, scope: Scope<'s>) -> Result<Cow<'s, str>, WikiError> {
        match (field, scope) {
            (Field::Title, Scope::Page(page)) => Ok(Cow::Borrowed(page.title.as_str())),
            (Field::Body, Scope::Page(page)) => Ok(String::from_utf8_lossy(&page.body)),
            (Field::Page, Scope::Item(title)) => Ok(Cow::Borrowed(title)),
            _ => Err(self.unavailable(field)),
        }
    }

    fn unavailable(&self, field: Field) -> WikiError {
        WikiError::Render(format!(
            "template '{}' references '{}' which is not available here",
            self.name,
            field.as_str()
        ))
    }
}

/// All templates, compiled once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct Templates {
    view: Template,
    edit: Template,
    top: Template,
}

impl Templates {
    /// Load and compile `<dir>/<name>.html` for every template.
    /// A missing or malformed file fails the whole load.
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        let read = |name: TemplateName| -> Result<Template, WikiError> {
            let path = dir.join(format!("{}.html", name.as_str()));
            let source = fs::read_to_string(&path).map_err(|e| WikiError::TemplateParse {
                name: name.as_str().to_string(),
                reason: format!("cannot read {:?}: {}", path, e),
            })?;
            debug!("Loaded template {:?}, {} bytes", path, source.len());
            Template::parse(name.as_str(), &source)
        };

        let templates = Self {
            view: read(TemplateName::View)?,
            edit: read(TemplateName::Edit)?,
            top: read(TemplateName::Top)?,
        };
        info!("Loaded {} templates from {:?}", TemplateName::ALL.len(), dir);
        Ok(templates)
    }

    /// Compile templates from in-memory sources
    pub fn from_sources(view: &str, edit: &str, top: &str) -> Result<Self, WikiError> {
        Ok(Self {
            view: Template::parse(TemplateName::View.as_str(), view)?,
            edit: Template::parse(TemplateName::Edit.as_str(), edit)?,
            top: Template::parse(TemplateName::Top.as_str(), top)?,
        })
    }

    pub fn get(&self, name: TemplateName) -> &Template {
        match name {
            TemplateName::View => &self.view,
            TemplateName::Edit => &self.edit,
            TemplateName::Top => &self.top,
        }
    }

    pub fn render_page(&self, name: TemplateName, page: &Page) -> Result<String, WikiError> {
        let mut out = String::new();
        self.get(name).render_page(page, &mut out)?;
        Ok(out)
    }

    pub fn render_listing(&self, titles: &[String]) -> Result<String, WikiError> {
        let mut out = String::new();
        self.top.render_listing(titles, &mut out)?;
        Ok(out)
    }
}
