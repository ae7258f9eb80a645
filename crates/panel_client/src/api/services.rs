use super::models::{Service, ServiceDraft};
use super::{get_json, send_json};
use crate::auth::{Gateway, RequestOptions};
use crate::error::Result;

#[derive(Clone)]
pub struct ServicesApi {
    gateway: Gateway,
}

impl ServicesApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Service>> {
        get_json(&self.gateway, "servicios/").await
    }

    pub async fn create(&self, draft: &ServiceDraft) -> Result<Service> {
        send_json(&self.gateway, "servicios/", RequestOptions::post(), draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemorySessionStore, Session};
    use crate::config::ClientConfig;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_and_create_services() {
        let mut server = Server::new_async().await;
        let config = ClientConfig::new(&format!("{}/api/", server.url())).unwrap();
        let store = MemorySessionStore::with_session(Session::new("A1", "R1"));
        let services = ServicesApi::new(Gateway::new(config, Arc::new(store)));

        let _list = server
            .mock("GET", "/api/servicios/")
            .with_status(200)
            .with_body(r#"[{"id":1,"nombre":"Corte","descripcion":"","precio":"25.00","bot":3}]"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/servicios/")
            .match_body(Matcher::Json(json!({
                "nombre": "Tintura",
                "descripcion": "Color completo",
                "precio": "40.00",
                "bot": 3
            })))
            .with_status(201)
            .with_body(r#"{"id":2,"nombre":"Tintura","descripcion":"Color completo","precio":"40.00","bot":3}"#)
            .expect(1)
            .create_async()
            .await;

        let list = services.list().await.unwrap();
        assert_eq!(list[0].name, "Corte");

        let created = services
            .create(&ServiceDraft {
                name: "Tintura".to_string(),
                description: "Color completo".to_string(),
                price: "40.00".to_string(),
                bot: 3,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 2);

        create.assert_async().await;
    }
}
