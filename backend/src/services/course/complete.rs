//! # Course Completion Job
//!
//! `POST /api/course/complete` checks that the session has an outline, marks
//! it `Completing` and schedules the lesson and quiz generation as a
//! background job, returning the `job_id` right away.
//!
//! The job reports `InProgress(percent)` after every lesson through a
//! per-job channel that is forwarded to the central job controller, then
//! `Completed(<pdf url>)` or `Failed(<message>)`. The session is written back
//! to the store when the pipeline returns, whatever the outcome.

use crate::error::PipelineError;
use crate::job_controller::state::{percent, JobsState};
use crate::llm::CompletionApi;
use crate::pipeline::{self, ModuleScope, SessionContext};
use crate::services::course::load_session;
use crate::services::error::AppError;
use crate::services::state::AppState;
use crate::session::SessionStore;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::model::course::SessionStage;
use common::requests::{CompleteCourseRequest, JobStarted};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;

/// `POST /api/course/complete`
pub async fn process(
    state: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<CompleteCourseRequest>,
) -> impl Responder {
    match schedule_course_job(&state, &jobs, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(JobStarted { job_id }),
        Err(e) => e.error_response(),
    }
}

async fn schedule_course_job(
    state: &AppState,
    jobs: &JobsState,
    req: CompleteCourseRequest,
) -> Result<String, AppError> {
    let ctx = load_session(state, &req.session_id).await?;
    if ctx.stage != SessionStage::OutlineReady || ctx.outline.is_none() {
        return Err(PipelineError::InvalidStage {
            action: "complete the course",
            stage: ctx.stage,
        }
        .into());
    }

    // Visible to other requests while the job runs; the job itself works on
    // the `OutlineReady` copy.
    let mut running = ctx.clone();
    running.stage = SessionStage::Completing;
    state.sessions.put(running).await;

    let job_id = jobs.register().await;
    info!("Session {}: course job {} scheduled", ctx.id, job_id);

    tokio::spawn(run_course_job(
        state.completion.clone(),
        state.sessions.clone(),
        jobs.clone(),
        job_id.clone(),
        ctx,
        state.config.pipeline.module_scope,
    ));

    Ok(job_id)
}

async fn run_course_job(
    api: Arc<dyn CompletionApi>,
    sessions: SessionStore,
    jobs: JobsState,
    job_id: String,
    mut ctx: SessionContext,
    scope: ModuleScope,
) {
    jobs.report(&job_id, JobStatus::InProgress(0)).await;

    // Lesson progress arrives synchronously from the pipeline; forward it
    // to the job controller from a separate task.
    let (progress_tx, mut progress_rx) = mpsc::channel::<(usize, usize)>(100);
    let forwarder = {
        let jobs = jobs.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            while let Some((done, total)) = progress_rx.recv().await {
                jobs.report(&job_id, JobStatus::InProgress(percent(done, total)))
                    .await;
            }
        })
    };

    let result = pipeline::complete_course(api.as_ref(), &mut ctx, scope, move |done, total| {
        let _ = progress_tx.try_send((done, total));
    })
    .await;

    // The sender went away with the closure, so the forwarder drains and
    // stops; final status must come after the last progress update.
    let _ = forwarder.await;

    let status = match result {
        Ok(document) => {
            info!(
                "Job {}: {} lessons generated for session {}",
                job_id,
                document.lesson_count(),
                ctx.id
            );
            JobStatus::Completed(format!("/api/course/pdf/{}", ctx.id))
        }
        Err(e) => {
            error!("Job {} failed: {}", job_id, e);
            JobStatus::Failed(e.to_string())
        }
    };
    sessions.put(ctx).await;
    jobs.report(&job_id, status).await;
}
