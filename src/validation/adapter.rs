//! Handler wrappers that validate a request section before the handler runs.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::controller::handler::{Handler, HandlerFuture};
use crate::http::error::ApiError;
use crate::http::request::{ApiRequest, RequestSection, Validated};
use crate::validation::evaluator::{DtoSchema, ValidationMessages};
use crate::validation::Dto;

/// Validate the JSON body against `T` before calling `handler`.
pub fn body<T, C, H>(handler: H) -> impl Handler<C>
where
    T: Dto,
    C: Send + Sync + 'static,
    H: Handler<C>,
{
    validated::<T, C, H>(RequestSection::Body, handler)
}

/// Validate the query parameters against `T` before calling `handler`.
pub fn query<T, C, H>(handler: H) -> impl Handler<C>
where
    T: Dto,
    C: Send + Sync + 'static,
    H: Handler<C>,
{
    validated::<T, C, H>(RequestSection::Query, handler)
}

/// Validate the path parameters against `T` before calling `handler`.
pub fn params<T, C, H>(handler: H) -> impl Handler<C>
where
    T: Dto,
    C: Send + Sync + 'static,
    H: Handler<C>,
{
    validated::<T, C, H>(RequestSection::Params, handler)
}

/// Validate `section` against `T`, store the DTO as `Validated<T>` and call
/// `handler`. The handler is never invoked when validation fails.
///
/// A schema that does not compile is reported by `Handler::check`, so the
/// route fails to materialize.
pub fn validated<T, C, H>(section: RequestSection, handler: H) -> impl Handler<C>
where
    T: Dto,
    C: Send + Sync + 'static,
    H: Handler<C>,
{
    Validating::<T, H> {
        section,
        schema: DtoSchema::compile::<T>()
            .map(Arc::new)
            .map_err(|err| err.to_string()),
        handler: Arc::new(handler),
        dto: PhantomData,
    }
}

/// A handler behind a DTO check.
struct Validating<T, H> {
    section: RequestSection,
    schema: Result<Arc<DtoSchema>, String>,
    handler: Arc<H>,
    dto: PhantomData<fn() -> T>,
}

impl<T, C, H> Handler<C> for Validating<T, H>
where
    T: Dto,
    C: Send + Sync + 'static,
    H: Handler<C>,
{
    fn call(&self, controller: Arc<C>, mut req: ApiRequest) -> HandlerFuture {
        let section = self.section;
        let schema = self.schema.clone();
        let handler = Arc::clone(&self.handler);

        Box::pin(async move {
            let schema = schema.map_err(ApiError::internal)?;
            let messages = req
                .extensions()
                .get::<ValidationMessages>()
                .cloned()
                .unwrap_or_default();

            let dto: T = schema.evaluate(&req.section(section), &messages)?;
            tracing::trace!(dto = schema.dto(), section = %section, "Request section validated");
            req.extensions_mut().insert(Validated(dto));

            handler.call(controller, req).await
        })
    }

    fn check(&self) -> Result<(), String> {
        if let Err(message) = &self.schema {
            return Err(message.clone());
        }
        self.handler.check()
    }
}
