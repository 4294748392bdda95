//! Cloneable handles for talking to the services.

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
/// Channel failures become `PipelineError::ActorCommunicationError`.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, crate::error::PipelineError> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| crate::error::PipelineError::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| crate::error::PipelineError::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

mod pipeline_client;
mod store_sync_client;

pub use pipeline_client::*;
pub use store_sync_client::*;
