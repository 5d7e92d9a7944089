/// Backend used when Redis is off: lookups always miss, so restriction
/// reads go straight to Postgres and writes have nothing to invalidate.
#[derive(Clone, Debug, Default)]
pub struct NoopCacheStore;

impl NoopCacheStore {
    pub async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    pub async fn set(&self, _key: &str, _value: Vec<u8>, _ttl_seconds: u64) -> anyhow::Result<()> {
        Ok(())
    }

    pub async fn del(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_restrictions_are_never_returned() {
        let store = NoopCacheStore;
        store
            .set("ember:restrictions:1:roll", br#"{"users":[]}"#.to_vec(), 600)
            .await
            .unwrap();

        assert_eq!(store.get("ember:restrictions:1:roll").await.unwrap(), None);
        assert!(store.del("ember:restrictions:1:roll").await.is_ok());
    }
}
