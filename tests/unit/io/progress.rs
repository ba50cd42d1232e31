//! Tests for progress tracking across shards

#[cfg(test)]
mod tests {
    use traitweave::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
    use traitweave::io::progress::ProgressManager;

    // Tests a single shard gets one bar and no batch bar
    // Verified by always adding a batch bar
    #[test]
    fn test_single_shard() {
        let mut pm = ProgressManager::new();
        pm.initialize(&[10], "Generating");
        assert_eq!(pm.visible_shards(), 1);
        assert!(!pm.has_batch_bar());

        pm.set_current(0, 3);
        pm.advance(0);
        pm.complete_shard(0);
        pm.finish();
    }

    // Tests shard bars are capped and a batch bar is added
    // Verified by creating a bar for every shard
    #[test]
    fn test_many_shards() {
        let mut pm = ProgressManager::default();
        pm.initialize(&[2; 8], "Compositing");
        assert_eq!(pm.visible_shards(), MAX_INDIVIDUAL_PROGRESS_BARS);
        assert!(pm.has_batch_bar());

        for shard in 0..8 {
            pm.set_current(shard, shard);
            pm.advance(shard);
            pm.complete_shard(shard);
        }
        pm.finish();
    }

    // Tests updates before initialization are ignored
    // Verified by indexing missing bars
    #[test]
    fn test_uninitialized_updates() {
        let pm = ProgressManager::new();
        pm.advance(0);
        pm.set_current(1, 1);
        pm.complete_shard(2);
        pm.finish();
        assert_eq!(pm.visible_shards(), 0);
    }
}
