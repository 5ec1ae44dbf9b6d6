use admission_mutator::{mutation::ClusterCniMutator, review::ReviewHandler};

pub(crate) struct ApiServerState {
    pub(crate) review_handler: ReviewHandler<ClusterCniMutator>,
}
