use ola_rpc_client::{RpcClient, RpcClientError, Transport as _, jsonrpc};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn send_request_body_400_status() {
    const STATUS_CODE: u16 = 400;

    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(STATUS_CODE.into())
        .with_header("content-type", "text/plain")
        .create_async()
        .await;

    let error = RpcClient::new(&server.url(), None)
        .expect("url ok")
        .send("ola_getL1BatchNumber", Vec::new())
        .await
        .expect_err("should have failed to due to a HTTP status error");

    if let RpcClientError::HttpStatus(error) = error {
        assert_eq!(
            reqwest::Error::from(error).status(),
            Some(StatusCode::from_u16(STATUS_CODE).unwrap())
        );
    } else {
        unreachable!("Invalid error: {error}");
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn call_returns_result() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "ola_getL1BatchNumber",
            "params": [],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":0,"result":"0x2a"}"#)
        .create_async()
        .await;

    let client = RpcClient::new(&server.url(), None)?;
    let result: String = client.call("ola_getL1BatchNumber", Vec::new()).await?;
    assert_eq!(result, "0x2a");

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn json_rpc_error_is_surfaced() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            r#"{"jsonrpc":"2.0","id":0,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let error = RpcClient::new(&server.url(), None)?
        .send("ola_getBridgeContracts", Vec::new())
        .await
        .expect_err("should have failed with a JSON-RPC error");

    match error {
        RpcClientError::JsonRpcError { error, request } => {
            assert_eq!(
                error,
                jsonrpc::Error {
                    code: -32601,
                    message: "Method not found".to_string(),
                    data: None,
                }
            );
            assert!(request.contains("ola_getBridgeContracts"));
        }
        error => unreachable!("Invalid error: {error}"),
    }

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn missing_trie_node_is_retried_once() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            r#"{"jsonrpc":"2.0","id":0,"error":{"code":-32000,"message":"missing trie node abc"}}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let error = RpcClient::new(&server.url(), None)?
        .send("eth_getLogs", vec![json!({})])
        .await
        .expect_err("should have failed after the retry");

    assert!(matches!(error, RpcClientError::JsonRpcError { .. }));
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn extra_headers_are_sent() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":0,"result":null}"#)
        .create_async()
        .await;

    let mut headers = ola_rpc_client::HeaderMap::new();
    headers.insert("x-api-key", "secret".parse()?);

    let result = RpcClient::new(&server.url(), Some(headers))?
        .send("eth_getTransactionReceipt", vec![json!("0x00")])
        .await?;
    assert_eq!(result, serde_json::Value::Null);

    mock.assert_async().await;

    Ok(())
}
