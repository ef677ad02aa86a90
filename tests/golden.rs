// Epoch 0 vectors at real sizes: a 16 MiB cache and a 1 GiB dataset.

use ethereum_types::{H256, H512};
use fbcash::{calc_dataset_item, Full, Light};
use hex_literal::hex;

const MIX_HASH: [u8; 32] = hex!("c763d8572dec8e75534d2007e265fa95f21be2912fa0625842683ef4329f9021");
const RESULT: [u8; 32] = hex!("66168636ccf123558a858e585bf81400de28947be61d503c311dbb9d09703eed");

#[test]
fn epoch_zero_light() {
    let light = Light::new(0).unwrap();
    assert_eq!(light.cache_size(), 16_776_896);
    assert_eq!(light.full_size(), 1_073_739_904);
    assert_eq!(
        &light.cache()[..64],
        &hex!("5e493e76a1318e50815c6ce77950425532964ebbb8dcf94718991fa9a82eaf37658de68ca6fe078884e803da3a26a4aa56420a6867ebcd9ab0f29b08d1c48fed")[..]
    );
    assert_eq!(
        calc_dataset_item(light.cache(), 0),
        H512::from(hex!("22db2229cc516c46d2210086f1ab417e0bd1c3827c5ecc6af7d3a33f8dae332bab5aa31fc58e71cff27666e81bf418775e74839743ca9d410fdf514d009bcec2"))
    );

    let out = light.compute(H256::zero(), 0).unwrap();
    assert_eq!(out.mix_hash, H256::from(MIX_HASH));
    assert_eq!(out.result, H256::from(RESULT));

    let out = light.compute(H256::zero(), 1).unwrap();
    assert_eq!(
        out.mix_hash,
        H256::from(hex!(
            "fa321566c7a4a577cfb1da824bd0559fef18b9581be8541f438c27c0d95aee89"
        ))
    );
    assert_eq!(
        out.result,
        H256::from(hex!(
            "cc1db6e8454bd7194c2cfb4695c21346ea355ef9134f954cd2232c5eb0cbd34c"
        ))
    );

    let header_hash = H256::from(hex!(
        "c9149cc0386e689d789a1c2f3d5d169a61a6218ed30e74414dc736e442ef3d1f"
    ));
    let out = light.compute(header_hash, 0).unwrap();
    assert_eq!(
        out.mix_hash,
        H256::from(hex!(
            "8efaebd6ee84fb8e046ab55045bfbebfa56e587bbfba79cfad2eb6b542802ede"
        ))
    );
    assert_eq!(
        out.result,
        H256::from(hex!(
            "9cc5b2e83ffa344dbb972d81297bea05680a695eb132c1aa733a5f579c17bf80"
        ))
    );
}

#[test]
#[ignore = "materializes the 1 GiB epoch 0 dataset"]
fn epoch_zero_full() {
    let light = Light::new(0).unwrap();
    let full = Full::new(light, |percent| {
        eprintln!("generating dataset: {}%", percent);
        0
    })
    .unwrap();
    assert_eq!(
        &full.dag()[(full.dag_size() - 64)..],
        &hex!("ae16c67460239f2aa48aab8a7a6fe1076f77be26bda8bcbd85e7bbcf909a173da4cdb975e52bc6577418b911bfb8a18e2851f8b2e8887ef63ebeb8ef4ad05525")[..]
    );
    let out = full.compute(H256::zero(), 0).unwrap();
    assert_eq!(out.mix_hash, H256::from(MIX_HASH));
    assert_eq!(out.result, H256::from(RESULT));
    assert_eq!(out, full.light().compute(H256::zero(), 0).unwrap());
}
