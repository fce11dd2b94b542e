use avltree::{AvlTree, AvlTreeMap, Error, Result};

fn main() -> Result<()> {
    let mut map = AvlTreeMap::new();
    map.insert(0, "zero")?;
    map.insert(1, "one")?;
    map.insert(2, "two")?;
    map.insert(3, "three")?;
    map.insert(4, "four")?;
    map.insert(5, "five")?;
    assert_eq!(map.insert(2, "deux"), Err(Error::KeyExists));
    assert_eq!(map.get(&1), Ok(&"one"));
    map.remove(&1)?;
    assert_eq!(map.get(&1), Err(Error::KeyNotFound));

    // Upsert through the default value
    *map.get_or_default(6) = "six";
    assert_eq!(map.get(&6), Ok(&"six"));

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    let mut tree = AvlTree::new();
    for x in 0..5 {
        tree.insert(x)?;
    }
    assert!(tree.contains(&1));
    tree.remove(&1)?;
    assert!(!tree.contains(&1));

    print!("{{ ");
    for x in &tree {
        print!("{x}, ");
    }
    println!("}}");

    Ok(())
}
