use collab_server::connection_registry::ConnectionRegistry;
use collab_server::room_directory::RoomDirectory;
use collab_server::{router, session};
use proptest::prelude::*;
use system::{new_connection_id, ConnectionId, OutboundEvent, RoomEvent, RoomId};
use tokio::sync::mpsc::{channel, Receiver};

const CONNECTIONS: usize = 5;
const ROOMS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Join(usize, usize),
    Leave(usize, usize),
    Disconnect(usize),
    Route(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CONNECTIONS, 0..ROOMS).prop_map(|(c, r)| Op::Join(c, r)),
        2 => (0..CONNECTIONS, 0..ROOMS).prop_map(|(c, r)| Op::Leave(c, r)),
        1 => (0..CONNECTIONS).prop_map(Op::Disconnect),
        3 => (0..CONNECTIONS, 0..ROOMS).prop_map(|(c, r)| Op::Route(c, r)),
    ]
}

fn room_name(index: usize) -> RoomId {
    format!("ws-{}", index)
}

fn drain(rx: &mut Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut result = Vec::new();
    while let Ok(event) = rx.try_recv() {
        result.push(event);
    }
    result
}

proptest! {
    #[test]
    fn membership_stays_consistent(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut registry = ConnectionRegistry::new();
        let mut rooms = RoomDirectory::new();

        let mut ids: Vec<ConnectionId> = Vec::new();
        let mut outboxes: Vec<Receiver<OutboundEvent>> = Vec::new();
        for _ in 0..CONNECTIONS {
            let (tx, rx) = channel(1024);
            let id = new_connection_id();
            session::connect(&mut registry, id, tx);
            ids.push(id);
            outboxes.push(rx);
        }

        for op in ops {
            match op {
                Op::Join(c, r) => {
                    let room_id = room_name(r);
                    let joined = session::join(&mut registry, &mut rooms, ids[c], room_id.clone(), "p".into());
                    if registry.contains(&ids[c]) {
                        prop_assert_eq!(registry.current_room(&ids[c]), Some(&room_id));
                    } else {
                        prop_assert!(!joined);
                    }
                }
                Op::Leave(c, r) => {
                    let room_id = room_name(r);
                    session::leave(&mut registry, &mut rooms, ids[c], &room_id);
                    prop_assert!(!rooms.contains(&room_id, &ids[c]));
                }
                Op::Disconnect(c) => {
                    session::disconnect(&mut registry, &mut rooms, ids[c]);
                    prop_assert!(!registry.contains(&ids[c]));
                    prop_assert!(rooms.iter().all(|(_, members)| !members.contains(&ids[c])));
                }
                Op::Route(c, r) => {
                    for rx in outboxes.iter_mut() {
                        drain(rx);
                    }
                    let room_id = room_name(r);
                    let sender_in_room = registry.current_room(&ids[c]) == Some(&room_id);
                    let delivered = router::route(
                        &registry,
                        &rooms,
                        ids[c],
                        &room_id,
                        RoomEvent::FileSelected { file_id: "f".into() },
                    );

                    let mut expected = 0;
                    for (i, rx) in outboxes.iter_mut().enumerate() {
                        let should_receive = sender_in_room
                            && i != c
                            && registry.current_room(&ids[i]) == Some(&room_id);
                        let received = drain(rx);
                        if should_receive {
                            expected += 1;
                            prop_assert_eq!(
                                received,
                                vec![OutboundEvent::FileSelected {
                                    connection_id: ids[c],
                                    file_id: "f".into(),
                                }]
                            );
                        } else {
                            prop_assert!(received.is_empty());
                        }
                    }
                    prop_assert_eq!(delivered, expected);
                }
            }

            prop_assert!(session::is_consistent(&registry, &rooms));
            prop_assert!(rooms.iter().all(|(_, members)| !members.is_empty()));
        }
    }
}
