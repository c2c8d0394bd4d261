use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, info};

use super::{ApiError, AppState, RequestBody};
use crate::client::{MentionTarget, MessagingClient};
use crate::message::LinkCard;
use crate::staging::{self, MediaKind, StagedResource};

#[derive(Debug, Serialize)]
pub struct SendReply {
    status: &'static str,
    message: String,
}

impl SendReply {
    fn processed(what: &str) -> Json<Self> {
        Json(Self {
            status: "success",
            message: format!("{what} message send request processed"),
        })
    }
}

type Reply = Result<Json<SendReply>, ApiError>;

pub async fn send_text(State(state): State<AppState>, body: RequestBody) -> Reply {
    state.authorize(&body)?;

    let (Some(receiver), Some(content)) = (body.str_field("receiver"), body.str_field("content"))
    else {
        return Err(ApiError::MissingFields("receiver or content"));
    };
    let at_list = body.str_list("at_list");

    info!(
        "Sending text: receiver={}, length={}",
        receiver,
        content.chars().count()
    );

    let result = if at_list.is_empty() {
        state.client.send_text(content, receiver).await
    } else {
        info!("Mentioning users: {:?}", at_list);
        let mentions: Vec<MentionTarget> =
            at_list.iter().map(|wxid| MentionTarget::new(wxid)).collect();
        state
            .client
            .send_text_with_mentions(content, receiver, &mentions)
            .await
    };
    result.map_err(|source| ApiError::Send {
        what: "text",
        source,
    })?;

    info!("Text send request processed");
    Ok(SendReply::processed("text"))
}

pub async fn send_image(State(state): State<AppState>, body: RequestBody) -> Reply {
    send_media(&state, &body, MediaKind::Image).await
}

pub async fn send_file(State(state): State<AppState>, body: RequestBody) -> Reply {
    send_media(&state, &body, MediaKind::File).await
}

pub async fn send_video(State(state): State<AppState>, body: RequestBody) -> Reply {
    send_media(&state, &body, MediaKind::Video).await
}

pub async fn send_card(State(state): State<AppState>, body: RequestBody) -> Reply {
    state.authorize(&body)?;

    let (Some(receiver), Some(wxid)) = (body.str_field("receiver"), body.str_field("wxid")) else {
        return Err(ApiError::MissingFields("receiver or wxid"));
    };

    info!("Sending card: receiver={}, wxid={}", receiver, wxid);
    state
        .client
        .send_card(wxid, receiver)
        .await
        .map_err(|source| ApiError::Send {
            what: "card",
            source,
        })?;

    info!("Card send request processed: wxid={}", wxid);
    Ok(SendReply::processed("card"))
}

pub async fn send_link(State(state): State<AppState>, body: RequestBody) -> Reply {
    state.authorize(&body)?;

    let (Some(receiver), Some(url), Some(title)) = (
        body.str_field("receiver"),
        body.str_field("url"),
        body.str_field("title"),
    ) else {
        return Err(ApiError::MissingFields("receiver, url or title"));
    };

    info!("Sending link: receiver={}, url={}", receiver, url);
    let xml = LinkCard {
        title,
        description: body.str_field("desc").unwrap_or_default(),
        url,
    }
    .to_xml();

    state
        .client
        .send_xml(&xml, receiver)
        .await
        .map_err(|source| ApiError::Send {
            what: "link",
            source,
        })?;

    info!("Link send request processed: url={}", url);
    Ok(SendReply::processed("link"))
}

/// Shared path for image, file and video: fetch, validate, send, release.
async fn send_media(state: &AppState, body: &RequestBody, kind: MediaKind) -> Reply {
    state.authorize(body)?;

    let (Some(receiver), Some(path)) = (body.str_field("receiver"), body.str_field("path")) else {
        return Err(ApiError::MissingFields("receiver or path"));
    };

    info!("Sending {}: receiver={}, path={}", kind, receiver, path);

    let mut staged = state.fetcher.fetch(path, kind).await?;
    let outcome = deliver(state.client.as_ref(), &mut staged, receiver).await;
    debug!(
        "Releasing {} (temporary: {}, size: {:?})",
        staged.local_path().display(),
        staged.is_temporary(),
        staged.size_bytes()
    );
    staging::release(staged).await;
    outcome?;

    info!("{} send request processed: {}", kind, path);
    Ok(SendReply::processed(kind.noun()))
}

async fn deliver(
    client: &dyn MessagingClient,
    staged: &mut StagedResource,
    receiver: &str,
) -> Result<(), ApiError> {
    let kind = staged.kind();
    let ready = staging::validate(staged).await?;
    debug!(
        "Handing {} ({} bytes) to the client",
        ready.path().display(),
        ready.size_bytes()
    );

    let result = match kind {
        MediaKind::Image => client.send_image(ready.path(), receiver).await,
        MediaKind::File => client.send_file(ready.path(), receiver).await,
        MediaKind::Video => client.send_video(ready.path(), receiver).await,
    };
    result.map_err(|source| ApiError::Send {
        what: kind.noun(),
        source,
    })
}
