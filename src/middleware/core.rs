use std::sync::Arc;

use tracing::warn;

use crate::router::EndpointTarget;
use crate::server::{Request, Response};

/// Final stage of a request: produces the reply.
///
/// Implemented for every `Fn(&Request, &mut Response)` closure.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response) {
        self(req, res)
    }
}

/// A pipeline stage run before the handler.
///
/// A stage either advances with [`Next::run`] or finalizes the request by
/// replying through `res` and dropping `next`. Implemented for every
/// `Fn(&Request, &mut Response, Next<'_>)` closure.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>);
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&Request, &mut Response, Next<'a>) + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>) {
        self(req, res, next)
    }
}

#[derive(Clone, Copy)]
enum Terminal<'a> {
    /// End of the global chain: run the endpoint, via its pre-handler if any.
    Endpoint(&'a EndpointTarget),
    /// End of a pre-handler: run the real handler.
    Handler(&'a dyn Handler),
}

/// Continuation handed to each middleware stage.
///
/// `run` consumes the value, so a stage can advance the pipeline at most
/// once. Advancing after a reply was written halts the chain instead.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    index: usize,
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    fn new(chain: &'a [Arc<dyn Middleware>], terminal: Terminal<'a>) -> Self {
        Self {
            chain,
            index: 0,
            terminal,
        }
    }

    /// A continuation that goes straight to `handler`.
    ///
    /// Useful for running a single middleware, such as a validator, in
    /// isolation.
    #[must_use]
    pub fn handler(handler: &'a dyn Handler) -> Self {
        Self::new(&[], Terminal::Handler(handler))
    }

    /// Stages left before the terminal step.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }

    /// Advance to the next stage, or to the terminal step once the chain is
    /// exhausted.
    pub fn run(self, req: &Request, res: &mut Response) {
        if res.is_sent() {
            warn!(
                request_id = %req.request_id(),
                stage = self.index,
                "Continuation invoked after a reply was sent; chain halted"
            );
            return;
        }

        if let Some(stage) = self.chain.get(self.index) {
            let next = Next {
                chain: self.chain,
                index: self.index + 1,
                terminal: self.terminal,
            };
            stage.handle(req, res, next);
            return;
        }

        match self.terminal {
            Terminal::Endpoint(EndpointTarget::Handler(handler)) => handler.handle(req, res),
            Terminal::Endpoint(EndpointTarget::PreHandled {
                pre_handler,
                handler,
            }) => pre_handler.handle(req, res, Next::handler(handler.as_ref())),
            Terminal::Handler(handler) => handler.handle(req, res),
        }
    }
}

/// Ordered, immutable list of global middleware.
#[derive(Clone)]
pub struct Chain {
    stages: Arc<[Arc<dyn Middleware>]>,
}

impl Chain {
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Drive the chain for one request, ending at `target`.
    ///
    /// Stages run strictly in order and stage N+1 starts only when stage N
    /// calls its continuation. A stage that neither continues nor replies
    /// leaves `res` unsent.
    pub fn run(&self, req: &Request, res: &mut Response, target: &EndpointTarget) {
        Next::new(&self.stages, Terminal::Endpoint(target)).run(req, res)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stages.len())
            .finish()
    }
}
