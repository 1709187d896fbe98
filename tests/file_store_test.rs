use anyhow::Result;
use cartelera::{
    CatalogError, CatalogService, JsonFileCatalogStore, LocalStorage, MovieForm, MovieId,
};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> CatalogService<JsonFileCatalogStore<LocalStorage>> {
    let storage = LocalStorage::new(dir.path());
    CatalogService::new(JsonFileCatalogStore::new(storage, "data/catalog.json"))
}

#[tokio::test]
async fn test_catalog_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let (dune, roma) = {
        let service = open(&temp_dir);
        let dune = service.create(MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "8.50")).await?;
        let roma = service.create(MovieForm::new("Roma", "2018-08-30", "Drama", "6")).await?;
        (dune, roma)
    };
    assert!(temp_dir.path().join("data/catalog.json").exists());

    let service = open(&temp_dir);
    let movies = service.list().await?;
    assert_eq!(movies, vec![dune.clone(), roma.clone()]);

    service.delete(roma.id).await?;
    let coco = service.create(MovieForm::new("Coco", "2017-10-27", "Animation", "7")).await?;
    assert_eq!(coco.id, MovieId(3));

    let titles: Vec<_> = service.list().await?.into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Dune", "Coco"]);
    Ok(())
}

#[tokio::test]
async fn test_two_handles_detect_lost_update() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let first = open(&temp_dir);
    let second = open(&temp_dir);

    let movie = first.create(MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "8.50")).await?;
    let read_by_second = second.read(movie.id).await?;

    first
        .update(movie.id, MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "9").with_id(movie.id).with_version(movie.version))
        .await?;

    let result = second.update(movie.id, read_by_second.to_form()).await;
    assert!(matches!(result, Err(CatalogError::Conflict { .. })));
    assert_eq!(second.read(movie.id).await?.price.cents(), 900);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_through_one_handle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = Arc::new(open(&temp_dir));
    let movie = service.create(MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "8.50")).await?;

    let mut handles = Vec::new();
    for price in ["10", "11", "12"] {
        let service = Arc::clone(&service);
        let form = MovieForm::new("Dune", "2021-10-22", "Sci-Fi", price)
            .with_id(movie.id)
            .with_version(movie.version);
        handles.push(tokio::spawn(async move { service.update(movie.id, form).await }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(CatalogError::Conflict { .. }) => conflicts += 1,
            Err(e) => return Err(e.into()),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_handles_on_one_file_never_both_commit() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let first = Arc::new(open(&temp_dir));
    let second = Arc::new(open(&temp_dir));
    let movie = first.create(MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "8.50")).await?;

    for round in 0..25 {
        let current = first.read(movie.id).await?;
        let mut handles = Vec::new();
        for (service, price) in [(&first, "10"), (&second, "11")] {
            let service = Arc::clone(service);
            let form = MovieForm::new("Dune", "2021-10-22", "Sci-Fi", price)
                .with_id(movie.id)
                .with_version(current.version);
            handles.push(tokio::spawn(async move { service.update(movie.id, form).await }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => successes += 1,
                Err(CatalogError::Conflict { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        assert_eq!(successes, 1, "round {}", round);
        assert_eq!(second.read(movie.id).await?.version, current.version + 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_corrupt_catalog_surfaces_store_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::create_dir_all(temp_dir.path().join("data"))?;
    std::fs::write(temp_dir.path().join("data/catalog.json"), "[1, 2")?;

    let service = open(&temp_dir);
    let result = service.list().await;

    assert!(matches!(result, Err(CatalogError::Store(_))));
    Ok(())
}
