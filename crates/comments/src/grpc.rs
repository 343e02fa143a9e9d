//! gRPC front: maps [`CommentService`] onto the generated `comments_proto`
//! stubs, with error-kind-to-`tonic::Status` mapping per spec.md §6/§7.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use comments_proto::comments_server::Comments;
use comments_proto::{
    AddRequest, AddResponse, Comment as WireComment, EditRequest, EditResponse, GetBySkuRequest,
    GetBySkuResponse, GetByUserRequest, GetByUserResponse, GetInfoRequest, GetInfoResponse,
};
use tonic::{Request, Response, Status};

use crate::domain::{Comment, Error};
use crate::service::CommentService;

pub struct CommentsGrpc {
    pub service: Arc<CommentService>,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::CommentNotFound(_) => Status::not_found(err.to_string()),
            Error::NotMyComment => Status::permission_denied(err.to_string()),
            Error::EditTimeoutExceeded => Status::failed_precondition(err.to_string()),
            Error::Db(_) => Status::internal(err.to_string()),
        }
    }
}

impl From<Comment> for WireComment {
    fn from(c: Comment) -> Self {
        WireComment {
            id: c.id,
            user_id: c.user_id,
            sku: c.sku,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

fn parse_cursor_timestamp(raw: &str) -> Result<DateTime<Utc>, Status> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Status::invalid_argument("last_created_at is not a valid RFC3339 timestamp"))
}

#[tonic::async_trait]
impl Comments for CommentsGrpc {
    async fn add(&self, request: Request<AddRequest>) -> Result<Response<AddResponse>, Status> {
        let req = request.into_inner();
        let id = self.service.add(req.user_id, req.sku, req.content).await?;
        Ok(Response::new(AddResponse { id }))
    }

    async fn edit(&self, request: Request<EditRequest>) -> Result<Response<EditResponse>, Status> {
        let req = request.into_inner();
        self.service.edit(req.id, req.user_id, req.content).await?;
        Ok(Response::new(EditResponse {}))
    }

    async fn get_info(
        &self,
        request: Request<GetInfoRequest>,
    ) -> Result<Response<GetInfoResponse>, Status> {
        let comment = self.service.get_info_by_id(request.into_inner().id).await?;
        Ok(Response::new(GetInfoResponse {
            comment: Some(comment.into()),
        }))
    }

    async fn get_by_sku(
        &self,
        request: Request<GetBySkuRequest>,
    ) -> Result<Response<GetBySkuResponse>, Status> {
        let req = request.into_inner();
        let last_created_at = req
            .last_created_at
            .as_deref()
            .map(parse_cursor_timestamp)
            .transpose()?;

        let comments = self
            .service
            .get_list_by_sku(req.sku, last_created_at, req.last_user_id, req.limit)
            .await?;

        Ok(Response::new(GetBySkuResponse {
            comments: comments.into_iter().map(Into::into).collect(),
        }))
    }

    async fn get_by_user(
        &self,
        request: Request<GetByUserRequest>,
    ) -> Result<Response<GetByUserResponse>, Status> {
        let comments = self
            .service
            .get_list_by_user(request.into_inner().user_id)
            .await?;

        Ok(Response::new(GetByUserResponse {
            comments: comments.into_iter().map(Into::into).collect(),
        }))
    }
}
