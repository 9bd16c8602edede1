/// Generates the repetitive list/fetch methods on a client, with automatic
/// tracing. `$snake` names the single-entity method; the collection method
/// gets a `list_` prefix and a plural `s`.
#[macro_export]
macro_rules! impl_list_and_get {
    ($client:ty, $entity:ty, $error:ty, $snake:ident, $base:literal) => {
        paste::paste! {
            impl $client {
                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.api.get($base).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn $snake(&self, id: u64) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.api
                        .get(&format!("{}{}/", $base, id))
                        .await
                        .map_err(|err| match err {
                            $crate::error::ApiError::NotFound { .. } => <$error>::NotFound(id),
                            err => <$error>::from(err),
                        })
                }
            }
        }
    };
}
