//! Alloy provider construction. Every JSON-RPC request passes through
//! [`TracingLayer`] so `--log-filter deployer=trace` shows the full
//! conversation with the node.

use {
    alloy::{
        network::EthereumWallet,
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::{
            client::ClientBuilder,
            json_rpc::{RequestPacket, ResponsePacket},
        },
        signers::local::PrivateKeySigner,
        transports::TransportError,
    },
    std::{
        fmt::Debug,
        pin::Pin,
        task::{Context, Poll},
        time::Instant,
    },
    tower::{Layer, Service},
    url::Url,
};

/// Connects to `url` and signs every transaction with `signer`.
pub fn provider(url: &Url, signer: PrivateKeySigner) -> DynProvider {
    let rpc = ClientBuilder::default()
        .layer(TracingLayer)
        .http(url.clone());
    ProviderBuilder::new()
        .wallet(EthereumWallet::new(signer))
        .connect_client(rpc)
        .erased()
}

/// Layer that logs every request passing through and how long the node took
/// to answer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TracingLayer;

impl<S> Layer<S> for TracingLayer {
    type Service = TracedTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracedTransport { inner }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TracedTransport<S> {
    inner: S,
}

impl<S> Service<RequestPacket> for TracedTransport<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
    S::Response: Send + 'static + Debug,
    S::Error: Send + 'static + Debug,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let methods = req
            .requests()
            .iter()
            .map(|r| r.method().to_string())
            .collect::<Vec<_>>();
        for r in req.requests() {
            tracing::trace!(
                method = r.method(),
                id = %r.id(),
                params = ?r.params(),
                "executing request"
            );
        }

        let start = Instant::now();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await;
            let elapsed = start.elapsed();
            match &res {
                Ok(ResponsePacket::Single(response)) if response.is_error() => {
                    tracing::debug!(
                        ?methods,
                        ?elapsed,
                        payload = ?response.payload,
                        "node returned error"
                    );
                }
                Ok(_) => tracing::debug!(?methods, ?elapsed, "request completed"),
                Err(err) => tracing::debug!(?methods, ?elapsed, ?err, "request failed"),
            }
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::U256,
            providers::mock::{Asserter, MockTransport},
            rpc::client::RpcClient,
        },
    };

    #[tokio::test]
    async fn traced_transport_passes_responses_through() {
        let asserter = Asserter::new();
        let transport = TracingLayer.layer(MockTransport::new(asserter.clone()));
        let client = RpcClient::new(transport, true);
        let provider = ProviderBuilder::new().connect_client(client);

        asserter.push_success(&U256::from(1_114));
        assert_eq!(provider.get_chain_id().await.unwrap(), 1_114);

        asserter.push_failure_msg("header not found");
        let err = provider.get_block_number().await.unwrap_err();
        assert!(err.to_string().contains("header not found"));
    }
}
