//! The course generation pipeline.
//!
//! A session moves through
//! `Idle -> OutlineRequested -> OutlineReady -> {Editing, Completing} -> Done`,
//! with `Failed` reachable from any step that calls the completion API. Every
//! operation works on an explicit [`SessionContext`]; nothing here is global.
//! Calls are strictly sequential and never retried.

use crate::error::PipelineError;
use crate::llm::CompletionApi;
use crate::outline::parse_outline;
use crate::prompts;
use common::model::chat::ChatMessage;
use common::model::content::ContentRequest;
use common::model::course::{
    CourseDocument, CourseForm, CourseOutline, LessonContent, ModuleContent, SessionStage,
};
use common::requests::SessionSnapshot;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Which outline modules `complete_course` generates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleScope {
    #[default]
    All,
    /// Only the first module, as a quick preview of a course.
    FirstOnly,
}

/// Everything one user's course generation needs between requests.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub model: String,
    pub form: Option<CourseForm>,
    pub stage: SessionStage,
    /// Output of the meta-prompt, fed to the outline designer.
    pub refined_prompt: Option<String>,
    /// Free-text outline shown to (and edited by) the user.
    pub outline: Option<String>,
    /// Structure parsed from the outline when the course was generated.
    pub outline_structure: Option<CourseOutline>,
    pub document: Option<CourseDocument>,
    pub history: Vec<ChatMessage>,
}

impl SessionContext {
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            form: None,
            stage: SessionStage::Idle,
            refined_prompt: None,
            outline: None,
            outline_structure: None,
            document: None,
            history: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            model: self.model.clone(),
            stage: self.stage.clone(),
            form: self.form.clone(),
            refined_prompt: self.refined_prompt.clone(),
            outline: self.outline.clone(),
            outline_structure: self.outline_structure.clone(),
            document: self.document.clone(),
            history: self.history.clone(),
        }
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        warn!("Session {} failed: {}", self.id, err);
        self.stage = SessionStage::Failed(err.to_string());
        err
    }
}

/// Turn a course form into an outline with two completion calls: the
/// meta-prompt produces a refined prompt, which the outline designer answers.
pub async fn request_outline(
    api: &dyn CompletionApi,
    ctx: &mut SessionContext,
    form: CourseForm,
) -> Result<String, PipelineError> {
    validate_form(&form)?;
    match ctx.stage {
        SessionStage::Idle
        | SessionStage::OutlineReady
        | SessionStage::Done
        | SessionStage::Failed(_) => {}
        ref stage => {
            return Err(PipelineError::InvalidStage {
                action: "request an outline",
                stage: stage.clone(),
            })
        }
    }

    info!("Session {}: requesting outline for '{}'", ctx.id, form.course_name.trim());
    ctx.stage = SessionStage::OutlineRequested;
    ctx.form = Some(form.clone());
    ctx.outline_structure = None;
    ctx.document = None;

    let result = api
        .complete(&ctx.model, &[ChatMessage::system(prompts::meta_prompt(&form))])
        .await;
    let refined = match result {
        Ok(text) => text,
        Err(e) => return Err(ctx.fail(e.into())),
    };
    debug!("Session {}: refined prompt is {} chars", ctx.id, refined.chars().count());

    let result = api
        .complete(
            &ctx.model,
            &[
                ChatMessage::system(prompts::OUTLINE_SYSTEM_PROMPT),
                ChatMessage::user(refined.clone()),
            ],
        )
        .await;
    let outline = match result {
        Ok(text) => text,
        Err(e) => return Err(ctx.fail(e.into())),
    };

    ctx.refined_prompt = Some(refined);
    ctx.outline = Some(outline.clone());
    ctx.history.push(ChatMessage::user(form.summary()));
    ctx.history.push(ChatMessage::assistant(outline.clone()));
    ctx.stage = SessionStage::OutlineReady;
    Ok(outline)
}

/// Rewrite the current outline according to free-text instructions.
///
/// A failed call leaves the previous outline in place and the session
/// `OutlineReady`.
pub async fn edit_outline(
    api: &dyn CompletionApi,
    ctx: &mut SessionContext,
    instructions: &str,
) -> Result<String, PipelineError> {
    let instructions = instructions.trim();
    if instructions.is_empty() {
        return Err(PipelineError::Validation(
            "modification instructions must not be empty".to_string(),
        ));
    }
    let current = ready_outline(ctx, "edit the outline")?;

    ctx.stage = SessionStage::Editing;
    let result = api
        .complete(
            &ctx.model,
            &[
                ChatMessage::system(prompts::OUTLINE_SYSTEM_PROMPT),
                ChatMessage::user(prompts::modification_prompt(instructions, &current)),
            ],
        )
        .await;
    ctx.stage = SessionStage::OutlineReady;

    let outline = result?;
    info!("Session {}: outline edited", ctx.id);
    ctx.outline = Some(outline.clone());
    ctx.history.push(ChatMessage::user(instructions));
    ctx.history.push(ChatMessage::assistant(outline.clone()));
    Ok(outline)
}

/// Generate every lesson and one quiz per module of the ready outline.
///
/// `progress` is called after each lesson with `(done, total)`. A structure
/// parse failure returns the session to `OutlineReady`; a completion failure
/// marks it `Failed` and discards the partial document.
pub async fn complete_course<F>(
    api: &dyn CompletionApi,
    ctx: &mut SessionContext,
    scope: ModuleScope,
    mut progress: F,
) -> Result<CourseDocument, PipelineError>
where
    F: FnMut(usize, usize) + Send,
{
    let outline = ready_outline(ctx, "complete the course")?;
    ctx.stage = SessionStage::Completing;
    ctx.document = None;

    let result = api
        .complete(
            &ctx.model,
            &[
                ChatMessage::system(prompts::STRUCTURE_PROMPT),
                ChatMessage::user(outline),
            ],
        )
        .await;
    let structure_text = match result {
        Ok(text) => text,
        Err(e) => return Err(ctx.fail(e.into())),
    };

    let structure = match parse_outline(&structure_text) {
        Ok(structure) => structure,
        Err(e) => {
            warn!("Session {}: {}", ctx.id, e);
            ctx.stage = SessionStage::OutlineReady;
            return Err(e);
        }
    };

    let modules = match scope {
        ModuleScope::All => &structure.modules[..],
        ModuleScope::FirstOnly => &structure.modules[..1],
    };
    let total: usize = modules.iter().map(|m| m.lessons.len()).sum();
    let course_name = ctx
        .form
        .as_ref()
        .map(|f| f.course_name.trim().to_string())
        .unwrap_or_default();
    info!(
        "Session {}: generating {} lessons in {} modules",
        ctx.id,
        total,
        modules.len()
    );

    let mut done = 0;
    let mut contents = Vec::with_capacity(modules.len());
    for module in modules {
        let mut content = ModuleContent {
            name: module.name.clone(),
            lessons: Vec::with_capacity(module.lessons.len()),
            quiz: String::new(),
        };

        for lesson in &module.lessons {
            let prompt = prompts::lesson_prompt(&course_name, &module.name, lesson);
            let result = api.complete(&ctx.model, &[ChatMessage::user(prompt)]).await;
            let text = match result {
                Ok(text) => text,
                Err(e) => return Err(ctx.fail(e.into())),
            };
            content.lessons.push(LessonContent {
                name: lesson.clone(),
                text,
            });
            done += 1;
            progress(done, total);
        }

        let quiz_prompt = prompts::quiz_prompt(&content.lesson_text());
        let result = api
            .complete(&ctx.model, &[ChatMessage::user(quiz_prompt)])
            .await;
        content.quiz = match result {
            Ok(text) => text,
            Err(e) => return Err(ctx.fail(e.into())),
        };
        debug!("Session {}: module '{}' done", ctx.id, module.name);
        contents.push(content);
    }

    let document = CourseDocument {
        course_name,
        modules: contents,
    };
    ctx.outline_structure = Some(structure);
    ctx.document = Some(document.clone());
    ctx.history.push(ChatMessage::assistant(document.text()));
    ctx.stage = SessionStage::Done;
    info!("Session {}: course complete", ctx.id);
    Ok(document)
}

/// Start a new course in the same session. The model and history are kept.
pub fn reset(ctx: &mut SessionContext) {
    ctx.stage = SessionStage::Idle;
    ctx.form = None;
    ctx.refined_prompt = None;
    ctx.outline = None;
    ctx.outline_structure = None;
    ctx.document = None;
}

pub fn clear_history(ctx: &mut SessionContext) {
    ctx.history.clear();
}

/// Single-shot generation for the content page.
pub async fn generate_content(
    api: &dyn CompletionApi,
    model: &str,
    request: &ContentRequest,
) -> Result<String, PipelineError> {
    if request.topic.trim().is_empty() {
        return Err(PipelineError::Validation("topic must not be empty".to_string()));
    }
    let prompt = prompts::expand_with_options(
        request.content_type.trim(),
        request.topic.trim(),
        request.subject.trim(),
        request.edu_level.trim(),
        &request.options,
    );
    info!("Generating '{}' content with {}", request.content_type, model);
    let text = api
        .complete(
            model,
            &[
                ChatMessage::system(prompts::CONTENT_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
        )
        .await?;
    Ok(text)
}

fn validate_form(form: &CourseForm) -> Result<(), PipelineError> {
    if form.course_name.trim().is_empty() {
        return Err(PipelineError::Validation(
            "course name must not be empty".to_string(),
        ));
    }
    if !(CourseForm::MIN_MODULES..=CourseForm::MAX_MODULES).contains(&form.num_modules) {
        return Err(PipelineError::Validation(format!(
            "number of modules must be between {} and {}",
            CourseForm::MIN_MODULES,
            CourseForm::MAX_MODULES
        )));
    }
    Ok(())
}

fn ready_outline(ctx: &SessionContext, action: &'static str) -> Result<String, PipelineError> {
    match (&ctx.stage, &ctx.outline) {
        (SessionStage::OutlineReady, Some(outline)) => Ok(outline.clone()),
        (stage, _) => Err(PipelineError::InvalidStage {
            action,
            stage: stage.clone(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use common::model::chat::Role;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers completion calls from a fixed script and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedApi {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        pub(crate) calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl ScriptedApi {
        pub(crate) fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionApi for ScriptedApi {
        async fn complete(
            &self,
            model: &str,
            messages: &[ChatMessage],
        ) -> Result<String, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), messages.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["gpt-test".to_string()])
        }
    }

    pub(crate) fn form(name: &str) -> CourseForm {
        CourseForm {
            course_name: name.to_string(),
            edu_level: "本科".to_string(),
            difficulty: "初级".to_string(),
            num_modules: 2,
            duration: "4周".to_string(),
            credit: "2学分".to_string(),
        }
    }

    fn ready_context() -> SessionContext {
        let mut ctx = SessionContext::new("s1", "gpt-test");
        ctx.form = Some(form("Algebra"));
        ctx.outline = Some("# Algebra outline".to_string());
        ctx.stage = SessionStage::OutlineReady;
        ctx
    }

    const STRUCTURE: &str = r#"{"M1": ["L1", "L2"], "M2": ["L3"]}"#;

    #[tokio::test]
    async fn outline_takes_two_calls() {
        let api = ScriptedApi::replying(&["refined prompt", "# Outline"]);
        let mut ctx = SessionContext::new("s1", "gpt-test");

        let outline = request_outline(&api, &mut ctx, form("Algebra")).await.unwrap();

        assert_eq!(outline, "# Outline");
        assert_eq!(ctx.stage, SessionStage::OutlineReady);
        assert_eq!(ctx.refined_prompt.as_deref(), Some("refined prompt"));
        assert_eq!(ctx.history.len(), 2);
        assert_eq!(ctx.history[1], ChatMessage::assistant("# Outline"));

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "gpt-test");
        assert_eq!(calls[0].1[0].role, Role::System);
        assert!(calls[0].1[0].content.contains("Algebra"));
        assert_eq!(calls[1].1[1], ChatMessage::user("refined prompt"));
    }

    #[tokio::test]
    async fn blank_course_name_changes_nothing() {
        let api = ScriptedApi::replying(&[]);
        let mut ctx = SessionContext::new("s1", "gpt-test");

        let err = request_outline(&api, &mut ctx, form("   ")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(ctx.stage, SessionStage::Idle);
        assert!(ctx.form.is_none());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn module_count_is_bounded() {
        let api = ScriptedApi::replying(&[]);
        let mut ctx = SessionContext::new("s1", "gpt-test");
        let mut too_many = form("Algebra");
        too_many.num_modules = 16;

        let err = request_outline(&api, &mut ctx, too_many).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_outline_call_marks_session_failed() {
        let api = ScriptedApi::new(vec![Err(ProviderError::Unauthorized { status: 401 })]);
        let mut ctx = SessionContext::new("s1", "gpt-test");

        let err = request_outline(&api, &mut ctx, form("Algebra")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Completion(_)));
        assert!(matches!(ctx.stage, SessionStage::Failed(_)));
        assert!(ctx.outline.is_none());
    }

    #[tokio::test]
    async fn edit_replaces_outline() {
        let api = ScriptedApi::replying(&["# New outline"]);
        let mut ctx = ready_context();

        let outline = edit_outline(&api, &mut ctx, "add a module on matrices")
            .await
            .unwrap();

        assert_eq!(outline, "# New outline");
        assert_eq!(ctx.outline.as_deref(), Some("# New outline"));
        assert_eq!(ctx.stage, SessionStage::OutlineReady);
        let calls = api.calls.lock().unwrap();
        assert!(calls[0].1[1].content.contains("add a module on matrices"));
        assert!(calls[0].1[1].content.contains("# Algebra outline"));
    }

    #[tokio::test]
    async fn failed_edit_keeps_previous_outline() {
        let api = ScriptedApi::new(vec![Err(ProviderError::RateLimited {
            retry_after_secs: 60,
        })]);
        let mut ctx = ready_context();

        assert!(edit_outline(&api, &mut ctx, "shorter").await.is_err());
        assert_eq!(ctx.outline.as_deref(), Some("# Algebra outline"));
        assert_eq!(ctx.stage, SessionStage::OutlineReady);
    }

    #[tokio::test]
    async fn edit_requires_an_outline() {
        let api = ScriptedApi::replying(&["unused"]);
        let mut ctx = SessionContext::new("s1", "gpt-test");

        let err = edit_outline(&api, &mut ctx, "shorter").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStage {
                stage: SessionStage::Idle,
                ..
            }
        ));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn completes_every_module_in_order() {
        let api = ScriptedApi::replying(&[STRUCTURE, "t1", "t2", "q1", "t3", "q2"]);
        let mut ctx = ready_context();
        let mut seen = Vec::new();

        let document = complete_course(&api, &mut ctx, ModuleScope::All, |done, total| {
            seen.push((done, total))
        })
        .await
        .unwrap();

        assert_eq!(api.call_count(), 6);
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(document.course_name, "Algebra");
        assert_eq!(document.modules.len(), 2);
        assert_eq!(document.modules[1].name, "M2");
        assert_eq!(document.text(), "t1\n\nt2\n\n\n\nq1\n\nt3\n\n\n\nq2");
        assert_eq!(ctx.stage, SessionStage::Done);
        assert_eq!(ctx.document, Some(document));

        let calls = api.calls.lock().unwrap();
        assert!(calls[1].1[0].content.contains("模块'M1'的课程'L1'"));
        assert!(calls[3].1[0].content.ends_with("t1\n\nt2\n\n"));
    }

    #[tokio::test]
    async fn first_only_scope_stops_after_one_module() {
        let api = ScriptedApi::replying(&[STRUCTURE, "t1", "t2", "q1"]);
        let mut ctx = ready_context();

        let document = complete_course(&api, &mut ctx, ModuleScope::FirstOnly, |_, _| {})
            .await
            .unwrap();

        assert_eq!(api.call_count(), 4);
        assert_eq!(document.modules.len(), 1);
        assert_eq!(document.lesson_count(), 2);
    }

    #[tokio::test]
    async fn unparseable_structure_returns_to_outline_ready() {
        let api = ScriptedApi::replying(&[r#"{"M1": [L1]}"#]);
        let mut ctx = ready_context();

        let err = complete_course(&api, &mut ctx, ModuleScope::All, |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::OutlineParse(_)));
        assert_eq!(ctx.stage, SessionStage::OutlineReady);
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn lesson_failure_halts_without_a_document() {
        let api = ScriptedApi::new(vec![
            Ok(STRUCTURE.to_string()),
            Ok("t1".to_string()),
            Err(ProviderError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
            Ok("never used".to_string()),
        ]);
        let mut ctx = ready_context();

        let err = complete_course(&api, &mut ctx, ModuleScope::All, |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Completion(_)));
        assert!(matches!(ctx.stage, SessionStage::Failed(ref msg) if msg.contains("boom")));
        assert!(ctx.document.is_none());
        assert_eq!(api.call_count(), 3);
    }

    #[test]
    fn reset_keeps_model_and_history() {
        let mut ctx = ready_context();
        ctx.history.push(ChatMessage::user("hello"));

        reset(&mut ctx);
        assert_eq!(ctx.stage, SessionStage::Idle);
        assert!(ctx.outline.is_none());
        assert_eq!(ctx.model, "gpt-test");
        assert_eq!(ctx.history.len(), 1);

        clear_history(&mut ctx);
        assert!(ctx.history.is_empty());
    }

    #[tokio::test]
    async fn content_generation_uses_system_prompt() {
        let api = ScriptedApi::replying(&["# 练习"]);
        let request = ContentRequest {
            content_type: "练习题目".to_string(),
            topic: "二次方程".to_string(),
            subject: "数学".to_string(),
            edu_level: "初中".to_string(),
            options: Default::default(),
            model: None,
        };

        let text = generate_content(&api, "gpt-4", &request).await.unwrap();

        assert_eq!(text, "# 练习");
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "gpt-4");
        assert_eq!(calls[0].1[0], ChatMessage::system(prompts::CONTENT_SYSTEM_PROMPT));
        assert!(calls[0].1[1].content.contains("二次方程"));
    }

    #[tokio::test]
    async fn content_generation_needs_a_topic() {
        let api = ScriptedApi::replying(&[]);
        let request = ContentRequest {
            content_type: "课程大纲".to_string(),
            topic: " ".to_string(),
            subject: String::new(),
            edu_level: String::new(),
            options: Default::default(),
            model: None,
        };
        assert!(matches!(
            generate_content(&api, "gpt-4", &request).await,
            Err(PipelineError::Validation(_))
        ));
    }
}
